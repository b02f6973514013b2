//! # Timberline CLI
//!
//! Terminal front-end for sizing simply-supported timber beams.
//!
//! Prompts for material, span and loads, runs the chosen sizing search and
//! prints the utilisation report. Pass a file path as the first argument to
//! also save the report as JSON.
//!
//! Set `RUST_LOG=debug` to trace every section the search evaluates.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use timber_core::calculations::auto_size::{
    size_by_breadth, size_by_height, size_from_standard_catalog, IncrementalSearch, SizingResult,
};
use timber_core::calculations::beam::TimberBeam;
use timber_core::calculations::utilisation::DesignInput;
use timber_core::ec5_factors::LoadDuration;
use timber_core::materials::TimberMaterial;
use timber_core::section::TimberSection;
use timber_core::{save_report, CalcError, CalcResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input).ok()?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_line(prompt).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Service class as typed; anything but a whole number is rejected.
fn parse_service_class(answer: Option<&str>) -> CalcResult<u8> {
    match answer {
        None => Ok(1),
        Some(text) => text
            .parse()
            .map_err(|_| CalcError::invalid_input("service_class", text, "Service class must be 1, 2 or 3")),
    }
}

fn prompt_str(prompt: &str, default: &str) -> String {
    prompt_line(prompt).unwrap_or_else(|| default.to_string())
}

fn prompt_bool(prompt: &str, default: bool) -> bool {
    match prompt_line(prompt).map(|s| s.to_lowercase()) {
        Some(answer) if answer.starts_with('y') => true,
        Some(answer) if answer.starts_with('n') => false,
        _ => default,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();
}

fn run() -> CalcResult<SizingResult> {
    let material_type = prompt_str(
        "Material type (softwood, hardwood, glulam, lvl, green_oak) [softwood]: ",
        "softwood",
    );
    let grade = prompt_str("Strength grade [C24]: ", "C24");
    let service_class = parse_service_class(prompt_line("Service class (1-3) [1]: ").as_deref())?;
    let material = Arc::new(TimberMaterial::new(&material_type, &grade, service_class)?);

    let span = prompt_f64("Span (mm) [3000]: ", 3000.0);
    let permanent = prompt_f64("Permanent load excluding self-weight (kN/m) [1.0]: ", 1.0);
    let imposed = prompt_f64("Imposed load (kN/m) [1.0]: ", 1.0);
    let duration = LoadDuration::from_str_flexible(&prompt_str("Load duration [medium_term]: ", "medium_term"))?;
    let load_sharing = prompt_bool("Load sharing? (y/n) [n]: ", false);
    let restrained = prompt_bool("Compression edge restrained? (y/n) [y]: ", true);
    let deflection_limit = prompt_f64(&format!("Deflection limit (mm) [{:.1}]: ", span / 250.0), span / 250.0);
    let psi_2 = prompt_f64("Imposed load ψ2 [0.3]: ", 0.3);

    let input = DesignInput::new(permanent, imposed, deflection_limit)
        .with_load_duration(duration)
        .with_load_sharing(load_sharing)
        .with_restraint(restrained)
        .with_psi_2(psi_2);

    println!();
    let mode = prompt_str("Sizing mode: (c)atalog, (h)eight, (b)readth [c]: ", "c");

    let section = TimberSection::new(47.0, 100.0, material)?;
    let mut beam = TimberBeam::new(section, span, 1.0)?;
    info!(material = %beam.material(), span, "sizing beam");

    match mode.chars().next() {
        Some('h') => {
            let breadth = prompt_f64("Fixed breadth (mm) [63]: ", 63.0);
            beam.set_breadth(breadth)?;
            size_by_height(&mut beam, &input, &IncrementalSearch::height())
        }
        Some('b') => {
            let height = prompt_f64("Fixed height (mm) [200]: ", 200.0);
            beam.set_height(height)?;
            size_by_breadth(&mut beam, &input, &IncrementalSearch::breadth())
        }
        _ => size_from_standard_catalog(&mut beam, &input),
    }
}

fn main() {
    init_tracing();

    println!("Timberline CLI - Timber Beam Sizing (EN 1995-1-1)");
    println!("=================================================");
    println!();

    match run() {
        Ok(sized) => {
            let report = sized.report;
            let ur = report.utilisation;
            println!();
            println!("═══════════════════════════════════════");
            println!("  SIZING RESULTS");
            println!("═══════════════════════════════════════");
            println!();
            println!("Section:  {:.0} x {:.0} mm", report.breadth, report.height);
            println!("Search:   {} after {} sections", sized.outcome, sized.evaluations);
            println!();
            println!("Utilisation:");
            println!("  Bending:    {:.2} {}", ur.bending_ur, status_icon(ur.bending_ur <= 1.0));
            println!("  Shear:      {:.2} {}", ur.shear_ur, status_icon(ur.shear_ur <= 1.0));
            match ur.ltb_ur {
                Some(ltb) => println!("  LTB:        {:.2} {}", ltb, status_icon(ltb <= 1.0)),
                None => println!("  LTB:        not applicable"),
            }
            println!("  Deflection: {:.2} {}", ur.deflection_ur, status_icon(ur.deflection_ur <= 1.0));
            println!();
            let (governing, _) = ur.governing_check();
            println!("═══════════════════════════════════════");
            println!("  RESULT: {} (governs: {})", if report.passes() { "PASS" } else { "FAIL" }, governing);
            println!("═══════════════════════════════════════");

            println!();
            println!("JSON Output:");
            if let Ok(json) = serde_json::to_string_pretty(&report) {
                println!("{}", json);
            }

            if let Some(path) = std::env::args().nth(1) {
                match save_report(&report, Path::new(&path)) {
                    Ok(()) => println!("\nReport saved to {}", path),
                    Err(e) => error!(error = %e, "could not save report"),
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    }
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_class() {
        assert_eq!(parse_service_class(None).unwrap(), 1);
        assert_eq!(parse_service_class(Some("3")).unwrap(), 3);
        assert!(matches!(
            parse_service_class(Some("1.9")),
            Err(CalcError::InvalidInput { ref field, .. }) if field == "service_class"
        ));
        assert!(parse_service_class(Some("two")).is_err());
    }
}
