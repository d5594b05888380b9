use std::sync::Arc;

use pc_domain::config::{Config, ConfigSeverity};
use pc_providers::util::resolve_api_key;
use pc_providers::{ModelGateway, OpenAiCompatProvider};

use crate::bootstrap::load_catalog;

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("persona-chat doctor");
    println!("===================\n");

    let mut all_passed = true;

    check_config_file(config_path);
    check_config_validation(config, &mut all_passed);
    check_catalog(config, &mut all_passed);
    check_upstream(config, &mut all_passed).await;

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

/// Informational only: defaults are a valid setup.
fn check_config_file(config_path: &str) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file",
        true,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }
    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({} error(s))", issues.len(), error_count),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

fn check_catalog(config: &Config, all_passed: &mut bool) {
    match load_catalog(config) {
        Ok(catalog) => print_check(
            "Character catalog",
            true,
            format!("{} character(s)", catalog.len()),
        ),
        Err(e) => {
            print_check("Character catalog", false, format!("{e:#}"));
            *all_passed = false;
        }
    }
}

async fn check_upstream(config: &Config, all_passed: &mut bool) {
    let key = match resolve_api_key(&config.llm) {
        Ok(k) => {
            print_check("API key", true, format!("${} is set", config.llm.api_key_env));
            k
        }
        Err(e) => {
            print_check("API key", false, e.to_string());
            *all_passed = false;
            return;
        }
    };

    let provider = match OpenAiCompatProvider::from_config(&config.llm, key) {
        Ok(p) => p,
        Err(e) => {
            print_check("Upstream reachable", false, e.to_string());
            *all_passed = false;
            return;
        }
    };

    let gateway = ModelGateway::new(Arc::new(provider));
    let healthy = gateway.health_check().await;
    print_check(
        "Upstream reachable",
        healthy,
        if healthy {
            format!("{} ({})", config.llm.base_url, gateway.default_model())
        } else {
            format!("{} (health check failed)", config.llm.base_url)
        },
    );
    if !healthy {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
