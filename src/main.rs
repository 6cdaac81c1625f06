mod analyzer;
mod checks;
mod config;
mod fetch;
mod record;
mod report;
mod score;
mod tls;
mod whois;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use crate::analyzer::{AnalyzeError, Analyzer};
use crate::config::Settings;

#[derive(Parser)]
#[command(
    name = "sitegrade",
    version,
    about = "Score a website's homepage and write an HTML + JSON report"
)]
struct Cli {
    /// URL of the homepage to analyze
    url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(io) = e.print() {
                warn!("Failed to print usage: {}", io);
            }
            return ExitCode::from(usage_status(e.kind()));
        }
    };

    let outcome = match Settings::load() {
        Ok(settings) => run(&cli.url, &settings).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("Failed to analyze the website: {}", cli.url);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Help and version requests succeed; any other argument error exits 1.
fn usage_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// `Ok(false)` when the page could not be fetched; nothing is written then.
async fn run(url: &str, settings: &Settings) -> anyhow::Result<bool> {
    let t0 = Instant::now();
    let analyzer = Analyzer::from_settings(settings)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(format!("Analyzing {}", url));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = analyzer.analyze(url).await;
    pb.finish_and_clear();

    let record = match result {
        Ok(record) => record,
        Err(AnalyzeError::Fetch { source, .. }) => {
            error!("{}", source);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let out = report::write(&record, &settings.output_dir)?;
    println!("Report generated: {}", out.html.display());
    println!("JSON record generated: {}", out.json.display());
    println!(
        "Overall score: {:.0}% ({:.1}s)",
        record.overall_score * 100.0,
        t0.elapsed().as_secs_f64()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(output_dir: &Path) -> Settings {
        Settings {
            output_dir: output_dir.to_path_buf(),
            fetch_timeout_secs: 1,
            whois_timeout_secs: 1,
            tls_timeout_secs: 1,
            whois_server: "127.0.0.1".into(),
            user_agent: "sitegrade-test".into(),
        }
    }

    fn written_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn argument_errors_exit_one() {
        let status = |args: &[&str]| match Cli::try_parse_from(args) {
            Ok(_) => None,
            Err(e) => Some(usage_status(e.kind())),
        };
        assert_eq!(status(&["sitegrade"]), Some(1));
        assert_eq!(status(&["sitegrade", "a.test", "b.test"]), Some(1));
        assert_eq!(status(&["sitegrade", "--help"]), Some(0));
        assert_eq!(status(&["sitegrade", "--version"]), Some(0));
        assert_eq!(status(&["sitegrade", "https://a.test"]), None);
    }

    #[tokio::test]
    async fn fetch_timeout_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>late</body></html>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("reports");
        let ok = run(&server.uri(), &settings(&out_dir)).await.unwrap();

        assert!(!ok);
        assert!(!out_dir.exists());
        let files = written_files(dir.path());
        assert!(!files
            .iter()
            .any(|f| f.ends_with("_record.json") || f.ends_with("_report.html")));
    }
}
