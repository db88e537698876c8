use clap::Parser;
use lnp_porter::utils::{logger, validation::Validate};
use lnp_porter::{
    BatchReport, CarrierConfig, CliConfig, JwtMinter, LocalCallingGuideClient, LocalStorage,
    NumberClassifier, OneVoiceClient, PortCoordinator, PortingEngine, UControlClient,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting lnp-porter batch run");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(cli).await {
        Ok(report) => {
            print_summary(&report);
            let exit_code = report.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            tracing::error!("❌ Batch run failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(3);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> lnp_porter::Result<BatchReport> {
    cli.validate()?;

    let carrier = CarrierConfig::from_file(&cli.config)?;
    carrier.validate()?;

    let timeout = carrier.request_timeout();
    let emergency = Arc::new(UControlClient::new(
        &carrier.ucontrol.base_url,
        &carrier.ucontrol.emergency.username,
        &carrier.ucontrol.emergency.password,
        timeout,
    )?);
    let ordinary = Arc::new(UControlClient::new(
        &carrier.ucontrol.base_url,
        &carrier.ucontrol.ordinary.username,
        &carrier.ucontrol.ordinary.password,
        timeout,
    )?);
    let rate_centers = Arc::new(LocalCallingGuideClient::new(
        &carrier.rate_center.base_url,
        timeout,
    )?);
    let classifier = NumberClassifier::new(emergency, ordinary, rate_centers);

    let submitter = OneVoiceClient::new(&carrier.onevoice.endpoint, timeout)?;
    let minter = JwtMinter::from_pem_file(
        &carrier.onevoice.private_key_path,
        &carrier.onevoice.application_name,
        &carrier.onevoice.security_id,
    )?;
    let coordinator = PortCoordinator::new(submitter, minter, carrier.port_order.clone());

    let storage = LocalStorage::new(cli.output_path.clone());
    let engine = PortingEngine::new(
        classifier,
        coordinator,
        storage,
        cli.batch.clone(),
        cli.concurrent_requests,
    );

    engine.run(&cli.numbers).await
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("Batch {} complete.", report.batch);
    println!(
        "  911 registered: {}, ordinary: {}, not found: {}, malformed: {}",
        report.emergency_count(),
        report.ordinary_count(),
        report.not_found_count(),
        report.rejected.len()
    );
    if !report.diagnostics.is_empty() {
        println!(
            "  ⚠️ {} lookup(s) could not be completed; see log for details",
            report.diagnostics.len()
        );
    }
    for artifact in &report.artifacts {
        println!("  📁 {}", artifact);
    }

    if report.manual_review_required() {
        println!("❌ Multiple 911 registrations: manual review required, no port requests were submitted.");
    } else if report.submission_failed() {
        let failed = report
            .outcomes
            .iter()
            .filter(|outcome| !outcome.accepted)
            .count();
        println!("❌ {} port submission(s) failed.", failed);
    } else {
        println!("✅ Batch processed successfully.");
    }
}
