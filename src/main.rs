use gradecheck::{banner, config, harness};

#[tokio::main]
async fn main() {
    // Print the startup banner
    banner::print_banner();

    // A missing .env is fine; everything has a default
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        }
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match config::HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    println!("🎯 Target: {}", config.base_url);
    println!("📁 Fixtures: {} (override with GRADECHECK_ASSETS)", config.assets_dir.display());

    let ctx = harness::HarnessContext::new(&config);
    let report = harness::run(&ctx, &harness::checks::suite(), config.check_timeout).await;

    if let Some(path) = &config.report_path {
        match report.write_json(path) {
            Ok(()) => println!("💾 Report written to {}", path.display()),
            Err(e) => log::error!("Failed to write report to {}: {}", path.display(), e),
        }
    }

    std::process::exit(report.exit_code());
}
