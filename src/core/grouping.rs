use crate::domain::model::{PhoneNumber, RateCenterGroups, RoutingInfo};

/// Partitions the non-911 set by rate center. Total over well-formed input:
/// every number lands in exactly one cohort, in input order.
pub fn group_by_rate_center(numbers: &[(PhoneNumber, RoutingInfo)]) -> RateCenterGroups {
    let mut groups = RateCenterGroups::default();
    for (number, info) in numbers {
        groups.push(&info.rate_center, number.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: &str, rate_center: &str) -> (PhoneNumber, RoutingInfo) {
        let number = PhoneNumber::parse(number).unwrap();
        let info = RoutingInfo {
            npa: number.npa().to_string(),
            nxx: number.nxx().to_string(),
            block: "A".to_string(),
            rate_center: rate_center.to_string(),
            region: "QC".to_string(),
            switch: "MTRLPQ02DS0".to_string(),
            ocn: "8084".to_string(),
        };
        (number, info)
    }

    #[test]
    fn test_groups_are_a_strict_partition() {
        let groups = group_by_rate_center(&[
            entry("5145551111", "MTRL"),
            entry("4165551111", "TRNTO"),
            entry("5145552222", "MTRL"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.total_numbers(), 3);
    }

    #[test]
    fn test_input_order_preserved_within_group() {
        let groups = group_by_rate_center(&[
            entry("5145553333", "MTRL"),
            entry("5145551111", "MTRL"),
            entry("5145552222", "MTRL"),
        ]);

        let group = groups.iter().next().unwrap();
        assert_eq!(
            group.numbers.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["5145553333", "5145551111", "5145552222"]
        );
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_rate_center(&[]).is_empty());
    }
}
