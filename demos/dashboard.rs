use anyhow::Result;
use churn_insight::{view, CsvUpload, Pipeline, Server, StageStatus};
use nanorand::{WyRand, RNG};
use std::path::PathBuf;

struct Args {
    api: Option<String>,
    file: Option<PathBuf>,
    target: String,
    rows: u32,
}

impl Args {
    pub fn from_env() -> Result<Self> {
        let mut args = pico_args::Arguments::from_env();
        Ok(Args {
            api: args.opt_value_from_str(["-a", "--api"])?,
            file: args.opt_value_from_str(["-f", "--file"])?,
            target: args
                .opt_value_from_str(["-t", "--target"])?
                .unwrap_or_else(|| "churn".to_owned()),
            rows: args.opt_value_from_str(["-r", "--rows"])?.unwrap_or(200),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::from_env()?;

    let server = match &args.api {
        Some(url) => Server::new(url.clone()),
        None => Server::from_env(),
    };
    println!("Service: {}", server.api_url());
    match server.ping() {
        Ok(message) => println!("Service says: {}", message),
        Err(err) => println!("Service unreachable: {}", err),
    }

    let pipeline = match &args.api {
        Some(url) => Pipeline::for_server(url),
        None => Pipeline::from_env(),
    };

    let upload = match &args.file {
        Some(path) => CsvUpload::from_path(path)?,
        None => {
            println!("No --file given, uploading {} synthetic rows", args.rows);
            CsvUpload::new("synthetic.csv", synthetic_csv(args.rows, 42))
        }
    };

    println!("\n1) Upload");
    pipeline.ingest(Some(upload));
    report(&pipeline, churn_insight::Stage::Dataset);

    println!("\n2) Train (target = {})", args.target);
    pipeline.train_model(&args.target, "customer_id");
    report(&pipeline, churn_insight::Stage::Train);

    println!("\n3) Metrics");
    pipeline.fetch_metrics();
    report(&pipeline, churn_insight::Stage::Metrics);

    println!("\n4) Score");
    pipeline.score_all();
    report(&pipeline, churn_insight::Stage::Score);

    let dashboard = view::project(pipeline.store());
    println!();
    if let Some(line) = &dashboard.dataset_line {
        println!("{}", line);
    }
    if let Some(line) = &dashboard.auc_line {
        println!("{}", line);
    }
    if let Some(line) = &dashboard.churn_line {
        println!("{}", line);
    }
    for point in &dashboard.chart {
        println!("{:>2}  {:<28} {:+.3}", point.index, point.name, point.weight);
    }
    if !dashboard.score_rows.is_empty() {
        println!("\n{:<12} {:>7}  Recommendation", "Customer", "Prob");
        for row in dashboard.score_rows.iter().take(15) {
            println!(
                "{:<12} {:>7}  {}",
                row.customer, row.probability, row.recommendation
            );
        }
    }

    Ok(())
}

fn report(pipeline: &Pipeline, stage: churn_insight::Stage) {
    match pipeline.store().status(stage) {
        StageStatus::Failed(reason) => println!("{} failed: {}", stage, reason),
        status => println!("{}: {}", stage, status),
    }
}

fn synthetic_csv(rows: u32, seed: u64) -> Vec<u8> {
    let mut rng = WyRand::new_seed(seed);
    let mut csv = String::from("customer_id,plan,tenure,churn\n");
    for i in 0..rows {
        let plan = match rng.generate::<u16>() % 3 {
            0 => "basic",
            1 => "plus",
            _ => "pro",
        };
        let tenure = rng.generate::<u16>() % 72;
        let churn = if rng.generate::<u16>() % 100 < 24 { 1 } else { 0 };
        csv.push_str(&format!("C{:05},{},{},{}\n", i, plan, tenure, churn));
    }
    csv.into_bytes()
}
