use crate::domain::model::{
    AddressRecord, ClassifiedNumber, DidClassification, ExportRecord, PhoneNumber, ReconciledState,
    RoutingInfo,
};
use crate::utils::error::{PortingError, Result};

/// A format-invalid input, rejected before any lookup was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedNumber {
    pub input: String,
    pub reason: String,
}

/// Renders the regulatory artifacts from the batch's final state.
///
/// Field-population rules, applied without exception:
/// - `Invalid` numbers never become CSV rows; they go to the invalid-numbers
///   artifact together with format-invalid inputs.
/// - a lone 911 registration exports its reconciled address verbatim;
/// - under manual review every 911 row keeps its address fields blank, so no
///   unverified address is asserted;
/// - ordinary lines always export blank address fields;
/// - `EnhancedCapable` is `"N"` on every row.
pub struct ExportRenderer;

impl ExportRenderer {
    pub fn render_csv(
        classified: &[ClassifiedNumber],
        reconciled: &ReconciledState,
    ) -> Result<String> {
        // Header goes out even for a row-less batch, so the artifact is
        // well-formed regardless of disposition mix.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER.split(','))?;

        for entry in classified {
            match &entry.classification {
                DidClassification::Invalid => continue,
                DidClassification::Is911(_) => match reconciled {
                    ReconciledState::SingleAuthoritative(address) => {
                        writer.serialize(ExportRecord::from_address(&entry.number, address))?;
                    }
                    _ => {
                        writer.serialize(ExportRecord::blank(&entry.number))?;
                    }
                },
                DidClassification::NonNine11(_) => {
                    writer.serialize(ExportRecord::blank(&entry.number))?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PortingError::ProcessingError {
                message: format!("CSV writer flush failed: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| PortingError::ProcessingError {
            message: format!("CSV output is not UTF-8: {}", e),
        })
    }

    /// One line per 911-classified number with its raw reconciled record.
    pub fn render_emergency_lines(registrations: &[(PhoneNumber, AddressRecord)]) -> Result<String> {
        let mut lines = String::new();
        for (number, address) in registrations {
            let raw = serde_json::to_string(address)?;
            lines.push_str(&format!("911 Info - {}: {}\n", number, raw));
        }
        Ok(lines)
    }

    /// One line per format-invalid or not-found number, labelled so the two
    /// causes stay distinguishable.
    pub fn render_invalid_lines(
        rejected: &[RejectedNumber],
        not_found: &[PhoneNumber],
    ) -> String {
        let mut lines = String::new();
        for rejection in rejected {
            lines.push_str(&format!(
                "Invalid Number - {}: {}\n",
                rejection.input, rejection.reason
            ));
        }
        for number in not_found {
            lines.push_str(&format!(
                "Invalid Number - {}: not found in carrier registries\n",
                number
            ));
        }
        lines
    }

    /// One line per ordinary number with its full routing record.
    pub fn render_routing_lines(numbers: &[(PhoneNumber, RoutingInfo)]) -> Result<String> {
        let mut lines = String::new();
        for (number, info) in numbers {
            let raw = serde_json::to_string(info)?;
            lines.push_str(&format!("NPA-NXX Info - {}: {}\n", number, raw));
        }
        Ok(lines)
    }
}

pub const CSV_HEADER: &str = "PhoneNumber,LastName,FirstName,StreetNumber,SuiteApt,StreetName,City,ProvinceState,PostalCodeZip,OtherAddressInfo,EnhancedCapable";

#[cfg(test)]
mod tests {
    use super::*;

    fn number(raw: &str) -> PhoneNumber {
        PhoneNumber::parse(raw).unwrap()
    }

    fn address(last_name: &str) -> AddressRecord {
        AddressRecord {
            last_name: last_name.to_string(),
            first_name: "Jane".to_string(),
            street_number: "123".to_string(),
            street_name: "Main St".to_string(),
            city: "Montreal".to_string(),
            province_state: "QC".to_string(),
            postal_zip: "H3A1A1".to_string(),
            ..AddressRecord::default()
        }
    }

    fn routing(rate_center: &str) -> RoutingInfo {
        RoutingInfo {
            npa: "514".to_string(),
            nxx: "555".to_string(),
            block: "A".to_string(),
            rate_center: rate_center.to_string(),
            region: "QC".to_string(),
            switch: "MTRLPQ02DS0".to_string(),
            ocn: "8084".to_string(),
        }
    }

    #[test]
    fn test_csv_header_present_even_without_rows() {
        let csv = ExportRenderer::render_csv(&[], &ReconciledState::NoConflict).unwrap();
        assert_eq!(csv.trim_end(), CSV_HEADER);
    }

    #[test]
    fn test_csv_header_matches_regulatory_layout() {
        let classified = vec![ClassifiedNumber {
            number: number("5145551111"),
            classification: DidClassification::NonNine11(routing("MTRL")),
        }];
        let csv = ExportRenderer::render_csv(&classified, &ReconciledState::NoConflict).unwrap();
        assert_eq!(csv.lines().next().unwrap(), CSV_HEADER);
    }

    #[test]
    fn test_single_authoritative_address_is_exported_verbatim() {
        let classified = vec![ClassifiedNumber {
            number: number("5145551234"),
            classification: DidClassification::Is911(address("Doe")),
        }];
        let reconciled = ReconciledState::SingleAuthoritative(address("Doe"));

        let csv = ExportRenderer::render_csv(&classified, &reconciled).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            "5145551234,Doe,Jane,123,,Main St,Montreal,QC,H3A1A1,,N"
        );
    }

    #[test]
    fn test_manual_review_blanks_address_fields() {
        let classified = vec![
            ClassifiedNumber {
                number: number("5145551111"),
                classification: DidClassification::Is911(address("Doe")),
            },
            ClassifiedNumber {
                number: number("5145552222"),
                classification: DidClassification::Is911(address("Roe")),
            },
        ];
        let reconciled = ReconciledState::RequiresManualReview(vec![
            (number("5145551111"), address("Doe")),
            (number("5145552222"), address("Roe")),
        ]);

        let csv = ExportRenderer::render_csv(&classified, &reconciled).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "5145551111,,,,,,,,,,N");
        assert_eq!(rows[2], "5145552222,,,,,,,,,,N");
    }

    #[test]
    fn test_ordinary_lines_export_blank_address_fields() {
        let classified = vec![ClassifiedNumber {
            number: number("5145551111"),
            classification: DidClassification::NonNine11(routing("MTRL")),
        }];

        let csv = ExportRenderer::render_csv(&classified, &ReconciledState::NoConflict).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows[1], "5145551111,,,,,,,,,,N");
    }

    #[test]
    fn test_invalid_numbers_are_excluded_from_csv() {
        let classified = vec![
            ClassifiedNumber {
                number: number("5145551111"),
                classification: DidClassification::Invalid,
            },
            ClassifiedNumber {
                number: number("5145552222"),
                classification: DidClassification::NonNine11(routing("MTRL")),
            },
        ];

        let csv = ExportRenderer::render_csv(&classified, &ReconciledState::NoConflict).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with("5145552222,"));
    }

    #[test]
    fn test_emergency_lines_carry_raw_record() {
        let lines = ExportRenderer::render_emergency_lines(&[(
            number("5145551234"),
            address("Doe"),
        )])
        .unwrap();
        assert!(lines.starts_with("911 Info - 5145551234: {"));
        assert!(lines.contains("\"LastName\":\"Doe\""));
    }

    #[test]
    fn test_invalid_lines_distinguish_causes() {
        let lines = ExportRenderer::render_invalid_lines(
            &[RejectedNumber {
                input: "0000000000".to_string(),
                reason: "malformed input".to_string(),
            }],
            &[number("5145559999")],
        );
        let rows: Vec<&str> = lines.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "Invalid Number - 0000000000: malformed input");
        assert_eq!(
            rows[1],
            "Invalid Number - 5145559999: not found in carrier registries"
        );
    }

    #[test]
    fn test_routing_lines_carry_full_record() {
        let lines =
            ExportRenderer::render_routing_lines(&[(number("5145551111"), routing("MTRL"))])
                .unwrap();
        assert!(lines.starts_with("NPA-NXX Info - 5145551111: {"));
        assert!(lines.contains("\"RateCenter\":\"MTRL\""));
        assert!(lines.contains("\"OCN\":\"8084\""));
    }
}
