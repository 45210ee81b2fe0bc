use core_types::CardId;
use datastore::MarketSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical grade buckets, coarse at the low end where sales are sparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeBucket {
    Raw,
    Psa1To7,
    Psa8,
    Psa9,
    Psa10,
}

impl GradeBucket {
    const ALL: [GradeBucket; 5] = [
        GradeBucket::Raw,
        GradeBucket::Psa1To7,
        GradeBucket::Psa8,
        GradeBucket::Psa9,
        GradeBucket::Psa10,
    ];

    fn index(&self) -> usize {
        match self {
            GradeBucket::Raw => 0,
            GradeBucket::Psa1To7 => 1,
            GradeBucket::Psa8 => 2,
            GradeBucket::Psa9 => 3,
            GradeBucket::Psa10 => 4,
        }
    }

    /// Numeric weight used for the average-grade calculation; the 1-7
    /// bucket sits at its midpoint.
    fn weight(&self) -> Decimal {
        match self {
            GradeBucket::Raw => dec!(0),
            GradeBucket::Psa1To7 => dec!(5),
            GradeBucket::Psa8 => dec!(8),
            GradeBucket::Psa9 => dec!(9),
            GradeBucket::Psa10 => dec!(10),
        }
    }

    fn of_label(label: &str) -> GradeBucket {
        match core_types::parse_psa_grade(label) {
            Some(10) => GradeBucket::Psa10,
            Some(9) => GradeBucket::Psa9,
            Some(8) => GradeBucket::Psa8,
            Some(1..=7) => GradeBucket::Psa1To7,
            _ => GradeBucket::Raw,
        }
    }
}

impl fmt::Display for GradeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GradeBucket::Raw => "Raw",
            GradeBucket::Psa1To7 => "PSA 1-7",
            GradeBucket::Psa8 => "PSA 8",
            GradeBucket::Psa9 => "PSA 9",
            GradeBucket::Psa10 => "PSA 10",
        };
        write!(f, "{label}")
    }
}

/// How rare a PSA 10 is within a card's graded population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationRarity {
    NoData,
    Common,
    Uncommon,
    Rare,
    VeryRare,
}

impl fmt::Display for PopulationRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PopulationRarity::NoData => "No Data",
            PopulationRarity::Common => "Common",
            PopulationRarity::Uncommon => "Uncommon",
            PopulationRarity::Rare => "Rare",
            PopulationRarity::VeryRare => "Very Rare",
        };
        write!(f, "{label}")
    }
}

/// One bucket of the grade distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub bucket: GradeBucket,
    pub count: usize,
    pub percentage: Decimal,
}

/// Distribution summary of a card's graded sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeStatistics {
    /// Counts and percentages in canonical bucket order; every bucket is
    /// present even at zero.
    pub distribution: Vec<BucketCount>,
    pub total_graded: usize,
    pub psa10_rarity_pct: Decimal,
    pub rarity: PopulationRarity,
    /// Count-weighted average on the 0-10 numeric scale.
    pub average_grade: Decimal,
    /// PSA 10 premium over the Raw bucket, percent; zero when either side
    /// has no priced sales.
    pub psa10_premium_pct: Decimal,
}

/// Summarizes the graded-sale population for one card.
///
/// Empty input yields the zeroed canonical distribution with
/// [`PopulationRarity::NoData`].
pub fn grade_statistics(snapshot: &MarketSnapshot, card_id: CardId) -> GradeStatistics {
    let sales = snapshot.graded(card_id);
    let total_graded = sales.len();

    let mut counts = [0usize; 5];
    let mut price_sums = [Decimal::ZERO; 5];
    for sale in sales {
        let index = GradeBucket::of_label(&sale.grade).index();
        counts[index] += 1;
        price_sums[index] += sale.price;
    }

    let distribution: Vec<BucketCount> = GradeBucket::ALL
        .iter()
        .enumerate()
        .map(|(index, bucket)| BucketCount {
            bucket: *bucket,
            count: counts[index],
            percentage: if total_graded > 0 {
                Decimal::from(counts[index]) / Decimal::from(total_graded) * dec!(100)
            } else {
                Decimal::ZERO
            },
        })
        .collect();

    let psa10_index = 4;
    let psa10_rarity_pct = distribution[psa10_index].percentage;

    let rarity = if total_graded == 0 || counts[psa10_index] == 0 {
        PopulationRarity::NoData
    } else if psa10_rarity_pct > dec!(20) {
        PopulationRarity::Common
    } else if psa10_rarity_pct > dec!(10) {
        PopulationRarity::Uncommon
    } else if psa10_rarity_pct > dec!(5) {
        PopulationRarity::Rare
    } else {
        PopulationRarity::VeryRare
    };

    let average_grade = if total_graded > 0 {
        let weighted: Decimal = GradeBucket::ALL
            .iter()
            .enumerate()
            .map(|(index, bucket)| bucket.weight() * Decimal::from(counts[index]))
            .sum();
        weighted / Decimal::from(total_graded)
    } else {
        Decimal::ZERO
    };

    let raw_avg = bucket_average(&counts, &price_sums, 0);
    let psa10_avg = bucket_average(&counts, &price_sums, psa10_index);
    let psa10_premium_pct = if raw_avg > Decimal::ZERO && psa10_avg > Decimal::ZERO {
        (psa10_avg - raw_avg) / raw_avg * dec!(100)
    } else {
        Decimal::ZERO
    };

    GradeStatistics {
        distribution,
        total_graded,
        psa10_rarity_pct,
        rarity,
        average_grade,
        psa10_premium_pct,
    }
}

fn bucket_average(counts: &[usize; 5], price_sums: &[Decimal; 5], index: usize) -> Decimal {
    if counts[index] == 0 {
        Decimal::ZERO
    } else {
        price_sums[index] / Decimal::from(counts[index])
    }
}
