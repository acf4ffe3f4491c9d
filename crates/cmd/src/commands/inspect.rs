use anyhow::{Context, Result};
use prevbuild_core::{BuildRecord, BuildSource, StepConfig, pipeline};

/// Prints how the current build is matched, without exporting anything.
pub async fn execute<S>(config: &StepConfig, source: &S) -> Result<()>
where
    S: BuildSource + ?Sized,
{
    let lookup = pipeline::lookup(source, &config.app_slug, &config.build_slug)
        .await
        .context("Failed to look up builds")?;

    let current = &lookup.current;
    println!("Build Details:");
    println!("  Slug:      {}", current.slug);
    println!("  Number:    {}", current.build_number);
    println!("  Branch:    {}", current.branch);
    println!("  Workflow:  {}", current.triggered_workflow);
    println!("  Type:      {}", current.build_type());
    println!("  Triggered: {}", current.triggered_at.to_rfc3339());
    println!();
    println!("Filter:");
    println!("{}", lookup.filter);
    println!();

    if lookup.candidates.is_empty() {
        println!("No builds found.");
    } else {
        println!(
            "{:<8} {:<24} {:<14} {:<12} {:<12}",
            "NUMBER", "SLUG", "TYPE", "STATUS", "NOTE"
        );
        println!("{}", "-".repeat(74));

        for candidate in &lookup.candidates {
            println!(
                "{:<8} {:<24} {:<14} {:<12} {:<12}",
                candidate.build_number,
                candidate.slug,
                candidate.build_type().as_str(),
                candidate.status_text,
                note(candidate, current)
            );
        }
    }
    println!();

    match lookup.previous() {
        Some(previous) => {
            println!(
                "Previous build: (#{}) {}: {}",
                previous.build_number, previous.slug, previous.status_text
            );
            println!(
                "Status changed: {}",
                prevbuild_core::changed(config.current_build_failed(), &previous.status_text)
            );
        }
        None => println!("No equivalent build found."),
    }

    Ok(())
}

fn note(candidate: &BuildRecord, current: &BuildRecord) -> &'static str {
    if candidate.build_number == current.build_number {
        "current"
    } else if candidate.in_progress() {
        "running"
    } else if !candidate.equivalent(current) {
        "different"
    } else {
        ""
    }
}
