//! Synthetic insurance dataset generation
//!
//! Writes a headered CSV with one policy per row. Provinces carry different
//! claim rates so that the province and postal code tests have something to
//! find, while gender has no effect on claims.

use std::path::PathBuf;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use rand_pcg::Pcg64;
use riskab_analysis::config::ColumnNames;

use crate::util::Output;

const CLAIM_RATE: f64 = 0.08;
const MISSING_GENDER_RATE: f64 = 0.05;

/// (province, claim rate multiplier, postal codes)
const PROVINCES: &[(&str, f64, &[u32])] = &[
    ("Gauteng", 1.4, &[2000, 2001, 2196, 1685]),
    ("Western Cape", 1.0, &[8000, 7441, 7700]),
    ("KwaZulu-Natal", 1.2, &[4001, 3610]),
    ("Eastern Cape", 0.8, &[6001, 5201]),
    ("Limpopo", 0.7, &[700]),
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDatasetArg {
    /// Number of policies to generate
    #[arg(long, default_value_t = 10000)]
    rows: usize,
    /// Random seed; a random one is chosen and printed when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug)]
struct Policy {
    province: &'static str,
    postal_code: u32,
    gender: Option<&'static str>,
    premium: f64,
    claims: f64,
}

struct PolicyGenerator {
    rng: Pcg64,
    premium: LogNormal<f64>,
    claim_amount: LogNormal<f64>,
}

impl PolicyGenerator {
    fn new(seed: u64) -> anyhow::Result<Self> {
        Ok(Self {
            rng: Pcg64::seed_from_u64(seed),
            premium: LogNormal::new(5.0, 0.5).context("Invalid premium distribution")?,
            claim_amount: LogNormal::new(8.0, 1.0).context("Invalid claim distribution")?,
        })
    }

    fn next_policy(&mut self) -> Policy {
        let rng = &mut self.rng;
        let (province, multiplier, postal_codes) = PROVINCES[rng.random_range(0..PROVINCES.len())];
        let postal_code = postal_codes[rng.random_range(0..postal_codes.len())];
        let gender = if rng.random_bool(MISSING_GENDER_RATE) {
            None
        } else if rng.random_bool(0.5) {
            Some("Male")
        } else {
            Some("Female")
        };
        let premium = self.premium.sample(rng);
        let claims = if rng.random_bool((CLAIM_RATE * multiplier).clamp(0.0, 1.0)) {
            self.claim_amount.sample(rng)
        } else {
            0.0
        };
        Policy {
            province,
            postal_code,
            gender,
            premium,
            claims,
        }
    }
}

pub(crate) fn run(arg: &GenerateDatasetArg) -> anyhow::Result<()> {
    let GenerateDatasetArg { rows, seed, output } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("Generating {rows} policies (seed: {seed})...");

    let mut generator = PolicyGenerator::new(seed)?;
    let output = Output::from_output_path(output.clone())?;
    let display_path = output.display_path();
    let mut writer = csv::Writer::from_writer(output);

    let columns = ColumnNames::default();
    writer
        .write_record([
            &columns.province,
            &columns.postal_code,
            &columns.gender,
            &columns.total_premium,
            &columns.total_claims,
        ])
        .with_context(|| format!("Failed to write CSV header to {display_path}"))?;

    let mut total_claims = 0;
    for _ in 0..*rows {
        let policy = generator.next_policy();
        if policy.claims > 0.0 {
            total_claims += 1;
        }
        writer
            .write_record([
                policy.province.to_owned(),
                policy.postal_code.to_string(),
                policy.gender.unwrap_or_default().to_owned(),
                format!("{:.2}", policy.premium),
                format!("{:.2}", policy.claims),
            ])
            .with_context(|| format!("Failed to write CSV row to {display_path}"))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {display_path}"))?;

    eprintln!("Wrote {rows} policies ({total_claims} with claims) to {display_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_policies() {
        let mut a = PolicyGenerator::new(42).unwrap();
        let mut b = PolicyGenerator::new(42).unwrap();
        for _ in 0..100 {
            let (pa, pb) = (a.next_policy(), b.next_policy());
            assert_eq!(pa.province, pb.province);
            assert_eq!(pa.postal_code, pb.postal_code);
            assert_eq!(pa.gender, pb.gender);
            assert!((pa.premium - pb.premium).abs() < f64::EPSILON);
            assert!((pa.claims - pb.claims).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_policies_are_consistent() {
        let mut generator = PolicyGenerator::new(7).unwrap();
        for _ in 0..1000 {
            let policy = generator.next_policy();
            let (_, _, codes) = PROVINCES
                .iter()
                .find(|(name, _, _)| *name == policy.province)
                .unwrap();
            assert!(codes.contains(&policy.postal_code));
            assert!(policy.premium > 0.0);
            assert!(policy.claims >= 0.0);
        }
    }
}
