// ==========================================
// School Infrastructure Compliance DSS - CLI Entry Point
// ==========================================
// Command surface: each pipeline stage is an idempotent unit of work
// over one or more academic years; `run` is the ordered invocation of
// every stage for all years present in the fact tables.
// ==========================================

use anyhow::{bail, Context, Result};
use school_infra_dss::db;
use school_infra_dss::domain::budget::BudgetConfig;
use school_infra_dss::engine::{PipelineOrchestrator, PipelineRepositories};
use school_infra_dss::importer::FactImporter;
use school_infra_dss::logging;
use std::path::Path;

fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", school_infra_dss::APP_NAME);
    tracing::info!("version: {}", school_infra_dss::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        print_usage();
        bail!("expected: school-infra-dss <db_path> <command> [args]");
    }

    let db_path = &args[1];
    let command = args[2].as_str();

    match command {
        "bootstrap" => {
            let conn = db::open_sqlite_connection(db_path).context("open database")?;
            db::bootstrap_schema(&conn).context("bootstrap schema")?;
            tracing::info!(db = %db_path, "schema ready");
        }
        "import" => {
            if args.len() != 7 {
                bail!("import needs: <schools.csv> <yearly.csv> <infrastructure.csv> <teachers.csv>");
            }
            bootstrap(db_path)?;
            let repos = PipelineRepositories::new(db_path)?;
            let importer = FactImporter::new(&repos);
            let reports = [
                importer.import_schools(Path::new(&args[3]))?,
                importer.import_yearly_metrics(Path::new(&args[4]))?,
                importer.import_infrastructure(Path::new(&args[5]))?,
                importer.import_teacher_metrics(Path::new(&args[6]))?,
            ];
            for report in reports {
                tracing::info!(
                    file = %report.file,
                    imported = report.rows_imported,
                    skipped = report.rows_skipped,
                    "import complete"
                );
            }
        }
        "run" => {
            bootstrap(db_path)?;
            let orchestrator = orchestrator(db_path, &args[3..])?;
            let result = orchestrator.run_full()?;
            tracing::info!(
                run_id = %result.run_id,
                stages = result.stages.len(),
                rows = result.total_rows(),
                "full pipeline complete"
            );
        }
        "stage" => {
            if args.len() < 4 {
                bail!("stage needs a stage name");
            }
            bootstrap(db_path)?;
            let flags = args.get(5..).unwrap_or(&[]);
            let orchestrator = orchestrator(db_path, flags)?;
            run_stage(&orchestrator, &args[3], args.get(4).map(|s| s.as_str()))?;
        }
        "simulate" => {
            // budget dry run: same algorithm as the committed stage,
            // nothing written back; report printed as JSON
            let orchestrator = orchestrator(db_path, args.get(3..).unwrap_or(&[]))?;
            let repos = std::sync::Arc::new(PipelineRepositories::new(db_path)?);
            let api = school_infra_dss::api::BudgetApi::new(repos);
            let report = api.simulate(None, orchestrator.budget_config())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other);
        }
    }

    Ok(())
}

fn bootstrap(db_path: &str) -> Result<()> {
    let conn = db::open_sqlite_connection(db_path).context("open database")?;
    db::bootstrap_schema(&conn).context("bootstrap schema")?;
    Ok(())
}

/// Build the orchestrator, reading optional budget overrides:
/// --classroom-budget N --cost-per-classroom N --teacher-posts N
fn orchestrator(db_path: &str, extra: &[String]) -> Result<PipelineOrchestrator> {
    let mut config = BudgetConfig::default();
    let mut iter = extra.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("flag {} needs a value", flag))?;
        match flag.as_str() {
            "--classroom-budget" => config.classroom_budget = value.parse()?,
            "--cost-per-classroom" => config.cost_per_classroom = value.parse()?,
            "--teacher-posts" => config.teacher_posts = value.parse()?,
            other => bail!("unknown flag: {}", other),
        }
    }

    let repos = PipelineRepositories::new(db_path)?;
    Ok(PipelineOrchestrator::new(repos, config))
}

fn run_stage(
    orchestrator: &PipelineOrchestrator,
    stage: &str,
    year: Option<&str>,
) -> Result<()> {
    let years: Vec<String> = match year {
        Some(y) => vec![y.to_string()],
        None => orchestrator.repositories().yearly.distinct_years()?,
    };

    match stage {
        "classroom_gap" => {
            for y in &years {
                orchestrator.run_classroom_gap(y)?;
            }
        }
        "teacher_adequacy" => {
            for y in &years {
                orchestrator.run_teacher_adequacy(y)?;
            }
        }
        "risk" => {
            for y in &years {
                orchestrator.run_risk(y)?;
            }
        }
        "prioritisation" => {
            for y in &years {
                orchestrator.run_prioritisation(y)?;
            }
        }
        "risk_trend" => {
            orchestrator.run_risk_trend()?;
        }
        "district" => {
            orchestrator.run_district_compliance()?;
        }
        "budget" => {
            let config = *orchestrator.budget_config();
            for y in &years {
                orchestrator.run_budget_allocation(y, &config)?;
            }
        }
        "forecast" => {
            orchestrator.run_forecast()?;
        }
        other => bail!(
            "unknown stage: {} (expected classroom_gap | teacher_adequacy | risk | \
             prioritisation | risk_trend | district | budget | forecast)",
            other
        ),
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: school-infra-dss <db_path> <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  bootstrap                                 create the schema");
    eprintln!("  import <schools> <yearly> <infra> <teachers>   load fact CSVs");
    eprintln!("  run [budget flags]                        run the full pipeline");
    eprintln!("  stage <name> [year] [budget flags]        run one stage");
    eprintln!("  simulate [budget flags]                   budget dry run (prints JSON)");
    eprintln!();
    eprintln!("Budget flags: --classroom-budget N --cost-per-classroom N --teacher-posts N");
}
