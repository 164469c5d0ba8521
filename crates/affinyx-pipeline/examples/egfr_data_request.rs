//! Example: EGFR Bioactivity Data Request
//!
//! This example runs the complete data-request flow against the live
//! ChEMBL API:
//! 1. Resolve the EGFR target (UniProt P00533) to a ChEMBL target id
//! 2. Fetch, clean and merge IC50 bioactivities with compound structures
//! 3. Partition the merged set with the default drug-likeness rules
//! 4. Export the compliant rows and their fingerprints to CSV

use affinyx_chembl::ChemblClient;
use affinyx_filters::{fingerprint_rows, ChunkedCsvExporter, CompoundFilter};
use affinyx_pipeline::BioactivityPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Affinyx Data Request: EGFR (UniProt P00533)           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Step 1: Run the pipeline against live ChEMBL
    println!("📋 Step 1: Bioactivity Pipeline");
    let client = ChemblClient::new()?;
    let pipeline = BioactivityPipeline::new("P00533");
    println!("   Target: UniProt {}", pipeline.uniprot_id());

    let activities = pipeline.run(&client).await?;
    println!("   ✓ {} merged compound activities\n", activities.len());

    if activities.is_empty() {
        println!("   No bioactivities recorded for this target. Nothing to filter.");
        return Ok(());
    }

    // Results are sorted by pIC50, so the head row is the most potent one.
    let strongest = &activities[0];
    if let Some(pic50) = strongest.pic50 {
        println!(
            "   Most potent: {} (IC50 {} {}, pIC50 {pic50:.2})\n",
            strongest.molecule_chembl_id, strongest.ic50, strongest.units
        );
    }

    // Step 2: Apply the default drug-likeness rules
    println!("🔬 Step 2: Drug-likeness Filtering");
    let filter = CompoundFilter::with_default_rules();
    let (compliant, violations) = filter.partition(&activities);
    println!("   ✓ {} compliant compounds", compliant.len());
    println!("   ✗ {} rule violations", violations.len());

    for violation in violations.iter().take(5) {
        println!(
            "     {} violates: {}",
            violation.record.molecule_chembl_id,
            violation.reason()
        );
    }
    println!();

    // Step 3: Export results and fingerprints
    println!("💾 Step 3: CSV Export");
    let exporter = ChunkedCsvExporter::new("egfr_compounds.csv");
    let written = exporter.export(&compliant)?;
    println!("   ✓ {written} rows appended to egfr_compounds.csv");

    let rows = fingerprint_rows(&compliant);
    let fp_exporter = ChunkedCsvExporter::new("egfr_fingerprints.csv");
    let written = fp_exporter.export(&rows)?;
    println!("   ✓ {written} fingerprint rows appended to egfr_fingerprints.csv");

    Ok(())
}
