use core_types::{CardId, RoiVerdict};
use datastore::MarketSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Friction taken off the top when selling the raw copy into a grading
/// play (shipping, fees, spread), as a share of the ungraded price.
const FRICTION_PCT: Decimal = dec!(0.10);

/// The grades worth evaluating; anything below PSA 8 rarely clears the fee.
const EVALUATED_GRADES: [u8; 3] = [8, 9, 10];

/// Ungraded-vs-graded expected-value comparison for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRoiReport {
    pub card_id: CardId,
    pub grading_cost: Decimal,
    /// Mean ungraded price the comparison is anchored on.
    pub ungraded_avg: Decimal,
    pub ungraded_sales: usize,
    /// True when no ungraded history existed and the first graded
    /// observation stood in for the raw price.
    pub used_graded_proxy: bool,
    /// One entry per evaluated grade (8, 9, 10), in that order.
    pub grades: Vec<GradeRoi>,
}

/// ROI outcome for a single grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRoi {
    pub grade: u8,
    pub outcome: RoiOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoiOutcome {
    /// No graded sales exist for this grade; explicitly not an error.
    NoGradedSales,
    Evaluated {
        graded_avg: Decimal,
        sales: usize,
        roi: Decimal,
        roi_pct: Decimal,
        verdict: RoiVerdict,
    },
}

/// A stateless calculator for grading return-on-investment.
#[derive(Debug, Default)]
pub struct GradingRoi {}

impl GradingRoi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the ungraded market (narrowed to `condition` when given)
    /// against graded sales for PSA 8/9/10.
    ///
    /// Per grade: `roi = graded_avg - ungraded_avg - grading_cost -
    /// 0.10 * ungraded_avg`, `roi_pct = roi / (ungraded_avg + grading_cost)
    /// * 100`.
    pub fn analyze(
        &self,
        snapshot: &MarketSnapshot,
        card_id: CardId,
        condition: Option<&str>,
        grading_cost: Decimal,
    ) -> GradingRoiReport {
        let ungraded: Vec<Decimal> = snapshot
            .listings(card_id)
            .iter()
            .filter(|p| condition.is_none_or(|c| p.condition == c))
            .map(|p| p.price)
            .collect();

        let graded = snapshot.graded(card_id);

        let (ungraded_avg, used_graded_proxy) = if ungraded.is_empty() {
            // No raw market at all: anchor on the first graded observation.
            match graded.first() {
                Some(sale) => (sale.price, true),
                None => (Decimal::ZERO, false),
            }
        } else {
            (
                ungraded.iter().sum::<Decimal>() / Decimal::from(ungraded.len()),
                false,
            )
        };

        let friction = ungraded_avg * FRICTION_PCT;
        let denominator = ungraded_avg + grading_cost;

        let grades = EVALUATED_GRADES
            .iter()
            .map(|&grade| {
                let sales: Vec<Decimal> = graded
                    .iter()
                    .filter(|s| s.psa_grade() == Some(grade))
                    .map(|s| s.price)
                    .collect();
                if sales.is_empty() {
                    return GradeRoi {
                        grade,
                        outcome: RoiOutcome::NoGradedSales,
                    };
                }

                let graded_avg = sales.iter().sum::<Decimal>() / Decimal::from(sales.len());
                let roi = graded_avg - ungraded_avg - grading_cost - friction;
                let roi_pct = if denominator > Decimal::ZERO {
                    roi / denominator * dec!(100)
                } else {
                    Decimal::ZERO
                };
                let verdict = if roi > Decimal::ZERO {
                    RoiVerdict::WorthGrading
                } else {
                    RoiVerdict::NotWorthGrading
                };
                tracing::debug!(card_id, grade, %roi, %roi_pct, "evaluated grading ROI");

                GradeRoi {
                    grade,
                    outcome: RoiOutcome::Evaluated {
                        graded_avg,
                        sales: sales.len(),
                        roi,
                        roi_pct,
                        verdict,
                    },
                }
            })
            .collect();

        GradingRoiReport {
            card_id,
            grading_cost,
            ungraded_avg,
            ungraded_sales: ungraded.len(),
            used_graded_proxy,
            grades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{GradedSale, PricePoint};

    fn listing(day: u32, price: Decimal) -> PricePoint {
        PricePoint {
            card_id: 1,
            timestamp: Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap(),
            price,
            condition: "Near Mint".to_string(),
            volume: None,
        }
    }

    fn sale(day: u32, price: Decimal, grade: &str) -> GradedSale {
        GradedSale {
            card_id: 1,
            timestamp: Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap(),
            price,
            grade: grade.to_string(),
        }
    }

    fn roi_for_grade(report: &GradingRoiReport, grade: u8) -> &RoiOutcome {
        &report
            .grades
            .iter()
            .find(|g| g.grade == grade)
            .unwrap()
            .outcome
    }

    #[test]
    fn worth_grading_arithmetic() {
        let snapshot = MarketSnapshot::new(
            vec![listing(1, dec!(30))],
            vec![sale(1, dec!(80), "psa10")],
            vec![],
        )
        .unwrap();
        let report = GradingRoi::new().analyze(&snapshot, 1, None, dec!(20));

        assert_eq!(report.ungraded_avg, dec!(30));
        match roi_for_grade(&report, 10) {
            RoiOutcome::Evaluated {
                roi,
                roi_pct,
                verdict,
                ..
            } => {
                assert_eq!(*roi, dec!(27));
                assert_eq!(*roi_pct, dec!(54));
                assert_eq!(*verdict, RoiVerdict::WorthGrading);
            }
            other => panic!("expected an evaluated outcome, got {other:?}"),
        }
    }

    #[test]
    fn absent_grade_reports_no_sales() {
        let snapshot = MarketSnapshot::new(
            vec![listing(1, dec!(30))],
            vec![sale(1, dec!(80), "psa10")],
            vec![],
        )
        .unwrap();
        let report = GradingRoi::new().analyze(&snapshot, 1, None, dec!(20));
        assert_eq!(*roi_for_grade(&report, 9), RoiOutcome::NoGradedSales);
        assert_eq!(*roi_for_grade(&report, 8), RoiOutcome::NoGradedSales);
    }

    #[test]
    fn empty_ungraded_series_uses_graded_proxy() {
        let snapshot = MarketSnapshot::new(
            vec![],
            vec![sale(1, dec!(50), "psa10"), sale(2, dec!(70), "psa10")],
            vec![],
        )
        .unwrap();
        let report = GradingRoi::new().analyze(&snapshot, 1, None, dec!(20));
        assert!(report.used_graded_proxy);
        assert_eq!(report.ungraded_avg, dec!(50));
        assert_eq!(report.ungraded_sales, 0);
    }

    #[test]
    fn losing_grade_is_not_worth_it() {
        let snapshot = MarketSnapshot::new(
            vec![listing(1, dec!(30))],
            vec![sale(1, dec!(40), "psa8")],
            vec![],
        )
        .unwrap();
        let report = GradingRoi::new().analyze(&snapshot, 1, None, dec!(20));
        match roi_for_grade(&report, 8) {
            RoiOutcome::Evaluated { roi, verdict, .. } => {
                assert_eq!(*roi, dec!(-13));
                assert_eq!(*verdict, RoiVerdict::NotWorthGrading);
            }
            other => panic!("expected an evaluated outcome, got {other:?}"),
        }
    }
}
