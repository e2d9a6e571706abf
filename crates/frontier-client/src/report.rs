//! The foreign-affairs report: one block per known foreign nation.
//!
//! Built from the nation summaries the client has cached. Labels are
//! message keys; a UI resolves them to localized text.

use frontier_protocol::{NationSummary, PlayerId};

/// One label/value line of a nation's block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub label_key: &'static str,
    pub value: String,
}

/// The block for one nation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationReport {
    pub player: PlayerId,
    pub rows: Vec<ReportRow>,
}

impl NationReport {
    /// Builds the rows for `summary`.
    ///
    /// Congress, tax and liberty rows only appear when their value is
    /// known; tax and liberty are percentages.
    pub fn new(player: PlayerId, summary: &NationSummary) -> Self {
        let mut rows = vec![
            row("report.stance", summary.stance.label_key()),
            row("report.numberOfColonies", summary.number_of_settlements),
            row("report.numberOfUnits", summary.number_of_units),
            row("report.militaryStrength", summary.military_strength),
            row("report.navalStrength", summary.naval_strength),
            row("goldTitle", summary.gold),
        ];
        if let Some(n) = summary.founding_fathers() {
            rows.push(row("report.continentalCongress.title", n));
        }
        if let Some(n) = summary.tax() {
            rows.push(row("tax", format!("{n}%")));
        }
        if let Some(n) = summary.sons_of_liberty() {
            rows.push(row("report.sonsOfLiberty", format!("{n}%")));
        }
        Self { player, rows }
    }

    /// The value shown for `label_key`, if that row is present.
    pub fn value(&self, label_key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label_key == label_key)
            .map(|r| r.value.as_str())
    }
}

fn row(label_key: &'static str, value: impl ToString) -> ReportRow {
    ReportRow {
        label_key,
        value: value.to_string(),
    }
}

/// The whole report, nations in player order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignAffairsReport {
    pub nations: Vec<NationReport>,
}

impl ForeignAffairsReport {
    /// Message key of the explanatory notice shown under the report.
    pub const NOTICE_KEY: &'static str = "report.foreignAffairs.notice";

    pub fn from_summaries<'a>(
        summaries: impl IntoIterator<Item = (PlayerId, &'a NationSummary)>,
    ) -> Self {
        let mut nations: Vec<_> = summaries
            .into_iter()
            .map(|(player, summary)| NationReport::new(player, summary))
            .collect();
        nations.sort_by_key(|n| n.player);
        Self { nations }
    }

    pub fn nation(&self, player: PlayerId) -> Option<&NationReport> {
        self.nations.iter().find(|n| n.player == player)
    }
}

#[cfg(test)]
mod tests {
    use frontier_protocol::Stance;

    use super::*;

    fn labels(report: &NationReport) -> Vec<&str> {
        report.rows.iter().map(|r| r.label_key).collect()
    }

    #[test]
    fn test_nation_report_all_known_values() {
        let summary = NationSummary {
            stance: Stance::War,
            number_of_settlements: 5,
            number_of_units: 40,
            military_strength: 12,
            naval_strength: 3,
            gold: 2500,
            founding_fathers: 4,
            tax: 20,
            sons_of_liberty: 35,
        };

        let report = NationReport::new(PlayerId(2), &summary);

        assert_eq!(report.value("report.stance"), Some("model.stance.war"));
        assert_eq!(report.value("report.numberOfColonies"), Some("5"));
        assert_eq!(report.value("goldTitle"), Some("2500"));
        assert_eq!(report.value("report.continentalCongress.title"), Some("4"));
        assert_eq!(report.value("tax"), Some("20%"));
        assert_eq!(report.value("report.sonsOfLiberty"), Some("35%"));
        assert_eq!(report.rows.len(), 9);
    }

    #[test]
    fn test_nation_report_omits_unknown_sentinels() {
        let summary = NationSummary {
            stance: Stance::Peace,
            tax: 0,
            ..NationSummary::default()
        };

        let report = NationReport::new(PlayerId(2), &summary);

        assert_eq!(
            labels(&report),
            [
                "report.stance",
                "report.numberOfColonies",
                "report.numberOfUnits",
                "report.militaryStrength",
                "report.navalStrength",
                "goldTitle",
                "tax",
            ]
        );
        assert_eq!(report.value("tax"), Some("0%"));
    }

    #[test]
    fn test_report_orders_nations_by_player() {
        let a = NationSummary::default();
        let b = NationSummary::default();

        let report = ForeignAffairsReport::from_summaries([(PlayerId(9), &a), (PlayerId(3), &b)]);

        let players: Vec<_> = report.nations.iter().map(|n| n.player).collect();
        assert_eq!(players, [PlayerId(3), PlayerId(9)]);
        assert!(report.nation(PlayerId(9)).is_some());
        assert!(report.nation(PlayerId(1)).is_none());
    }
}
