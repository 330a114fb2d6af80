//! Dataset profile
//!
//! Prints missing-value percentages for every column and descriptive
//! statistics for numeric columns, so that cleaning thresholds for the `test`
//! command can be chosen.

use clap::Args;
use riskab_analysis::{dataset::Dataset, preprocess};
use riskab_stats::{descriptive::DescriptiveStats, quantile::Quantiles};

use crate::util::DatasetInput;

const QUARTILES: [f64; 2] = [0.25, 0.75];

#[derive(Debug, Clone, Args)]
pub(crate) struct ProfileArg {
    #[clap(flatten)]
    pub input: DatasetInput,
}

pub(crate) fn run(arg: &ProfileArg) -> anyhow::Result<()> {
    let dataset = arg.input.read()?;

    println!("Dataset Profile");
    println!("===============\n");
    println!(
        "Rows: {}, Columns: {}\n",
        dataset.num_rows(),
        dataset.columns().len()
    );

    print_missing_table(&dataset);
    println!();
    print_numeric_table(&dataset)?;

    Ok(())
}

fn print_missing_table(dataset: &Dataset) {
    println!("Missing Values:");
    println!("  {:<24} {:>8} {:>10}", "Column", "Missing", "Missing%");
    // column(24) + missing(8) + pct(10) + spaces(2)
    println!("  {}", "-".repeat(44));
    for (column, (name, pct)) in dataset
        .columns()
        .iter()
        .zip(preprocess::missing_percentage(dataset))
    {
        println!(
            "  {:<24} {:>8} {:>9.2}%",
            name,
            column.missing_count(),
            pct
        );
    }
}

fn print_numeric_table(dataset: &Dataset) -> anyhow::Result<()> {
    println!("Numeric Columns:");
    println!(
        "  {:<24} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Count", "Min", "Q1", "Median", "Mean", "Q3", "Max", "Std Dev"
    );
    // column(24) + count(8) + 7 * value(12) + spaces(8)
    println!("  {}", "-".repeat(124));

    for column in dataset.columns().iter().filter(|c| c.is_numeric()) {
        let mut values = dataset.numeric_column(column.name())?;
        values.sort_by(f64::total_cmp);
        let Some(stats) = DescriptiveStats::from_sorted(&values) else {
            println!("  {:<24} {:>8}", column.name(), 0);
            continue;
        };
        let quartiles = Quantiles::from_sorted(&values, &QUARTILES);
        let fmt = |v: Option<f64>| v.map_or("N/A".to_string(), |v| format!("{v:.2}"));
        println!(
            "  {:<24} {:>8} {:>12.2} {:>12} {:>12.2} {:>12.2} {:>12} {:>12.2} {:>12}",
            column.name(),
            stats.count,
            stats.min,
            fmt(quartiles.get(0.25)),
            stats.median,
            stats.mean,
            fmt(quartiles.get(0.75)),
            stats.max,
            fmt(stats.std_dev),
        );
    }
    Ok(())
}
