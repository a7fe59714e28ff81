use crate::pipeline::stage::{Stage, StageStatus};
use crate::pipeline::store::{StageStore, StageView};

/// Fraction in [0,1] rendered as a one-decimal percentage.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Status block shared by every dashboard section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePanel {
    pub status: StageStatus,
    /// The displayed result predates the latest failed invocation.
    pub stale: bool,
    /// Prerequisite stage that has not succeeded yet, for warnings.
    pub needs: Option<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub index: usize,
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub customer: String,
    pub probability: String,
    pub recommendation: String,
}

/// Everything the presentation layer renders, derived from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub dataset: StagePanel,
    pub dataset_line: Option<String>,
    pub train: StagePanel,
    pub auc_line: Option<String>,
    pub metrics: StagePanel,
    pub churn_line: Option<String>,
    pub chart: Vec<ChartPoint>,
    pub score: StagePanel,
    pub score_rows: Vec<ScoreLine>,
}

/// Pure projection of the store; holds no state and performs no calls.
pub fn project(store: &StageStore) -> Dashboard {
    let dataset = store.dataset();
    let train = store.train();
    let metrics = store.metrics();
    let scores = store.scores();

    let dataset_line = dataset
        .value
        .as_ref()
        .map(|summary| {
            format!(
                "Loaded {} rows · Columns: {}",
                summary.rows,
                summary.columns.join(", ")
            )
        });

    let auc_line = train
        .value
        .as_ref()
        .and_then(|result| result.auc)
        .map(|auc| format!("AUC: {:.3}", auc));

    let churn_line = metrics
        .value
        .as_ref()
        .map(|snapshot| format!("Churn rate: {}", percent(snapshot.churn_rate)));

    // Chart points keep the service's ranking order.
    let chart = metrics
        .value
        .as_ref()
        .map(|snapshot| {
            snapshot
                .top_features
                .iter()
                .enumerate()
                .map(|(index, feature)| ChartPoint {
                    index,
                    name: feature.name.clone(),
                    weight: feature.weight,
                })
                .collect()
        })
        .unwrap_or_default();

    let score_rows = scores
        .value
        .as_ref()
        .map(|rows| {
            rows.iter()
                .enumerate()
                .map(|(position, row)| ScoreLine {
                    customer: row.identifier(position),
                    probability: percent(row.prob),
                    recommendation: row.recommendation.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Dashboard {
        dataset: panel(store, Stage::Dataset, &dataset),
        dataset_line,
        train: panel(store, Stage::Train, &train),
        auc_line,
        metrics: panel(store, Stage::Metrics, &metrics),
        churn_line,
        chart,
        score: panel(store, Stage::Score, &scores),
        score_rows,
    }
}

fn panel<T>(store: &StageStore, stage: Stage, view: &StageView<T>) -> StagePanel {
    let needs = stage
        .prerequisite()
        .filter(|prerequisite| !store.status(*prerequisite).is_succeeded());
    StagePanel {
        status: view.status.clone(),
        stale: view.stale,
        needs,
    }
}
