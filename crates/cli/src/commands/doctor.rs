use std::sync::Arc;

use catalog_core::config::{AppConfig, LoadOptions};
use catalog_core::ids::SequentialIdGenerator;
use catalog_db::{seed_demo_catalog, CatalogStore};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_seed_catalog());
            checks.push(check_images_dir(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["seed_catalog_integrity", "images_directory"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_seed_catalog() -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "seed_catalog_integrity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let store = CatalogStore::new(Arc::new(SequentialIdGenerator::default()));
        let seeded = seed_demo_catalog(&store)
            .await
            .map_err(|error| format!("demo catalog failed to load: {error}"))?;

        let dangling = store.dangling_products().await;
        if !dangling.is_empty() {
            return Err(format!(
                "{} seeded product(s) reference missing categories",
                dangling.len()
            ));
        }

        Ok::<_, String>((seeded.categories_seeded.len(), seeded.products_seeded))
    });

    match result {
        Ok((categories, products)) => DoctorCheck {
            name: "seed_catalog_integrity",
            status: CheckStatus::Pass,
            details: format!("{categories} categories and {products} products loaded with integrity"),
        },
        Err(error) => {
            DoctorCheck { name: "seed_catalog_integrity", status: CheckStatus::Fail, details: error }
        }
    }
}

fn check_images_dir(config: &AppConfig) -> DoctorCheck {
    let path = &config.assets.images_dir;
    if !path.exists() {
        return DoctorCheck {
            name: "images_directory",
            status: CheckStatus::Skipped,
            details: format!(
                "`{}` does not exist; {} will answer 404",
                path.display(),
                config.assets.mount_path
            ),
        };
    }

    if path.is_dir() {
        DoctorCheck {
            name: "images_directory",
            status: CheckStatus::Pass,
            details: format!("serving `{}` at {}", path.display(), config.assets.mount_path),
        }
    } else {
        DoctorCheck {
            name: "images_directory",
            status: CheckStatus::Fail,
            details: format!("`{}` exists but is not a directory", path.display()),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
