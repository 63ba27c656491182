// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Process entry point. Grounded on the teacher's `pipeline/src/main.rs`
//! (`clap::Parser::parse`, initialize tracing and metrics, dispatch on the
//! parsed subcommand, map the result to a process exit code) but scaled to
//! this engine's three subcommands and wrapped in a race against the
//! shutdown signal so an interrupted `run` exits with a distinct code
//! rather than hanging or panicking mid-pipeline.

use clap::Parser;

use slidetap_bootstrap::cli::{Cli, Commands};
use slidetap_bootstrap::exit_code::ExitCode;
use slidetap_bootstrap::signals::create_signal_handler;
use slidetap_bootstrap::{composition, demo, validator};
use slidetap_domain::entities::{Dataset, Project};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    slidetap_app::infrastructure::logging::init_logging(cli.json_logs);

    let code = tokio::select! {
        result = dispatch(&cli) => {
            match result {
                Ok(()) => ExitCode::Success,
                Err(err) => {
                    tracing::error!(error = %err, "command failed");
                    eprintln!("error: {err:#}");
                    err.downcast_ref::<slidetap_domain::error::CoreError>()
                        .map(ExitCode::from_core_error)
                        .unwrap_or(ExitCode::Software)
                }
            }
        }
        () = create_signal_handler().wait_for_shutdown() => {
            tracing::warn!("shutdown signal received before command finished");
            ExitCode::Interrupted
        }
    };

    std::process::exit(code.as_i32());
}

async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::ValidateSchema { schema } => {
            validator::require_file("schema", schema)?;
            let schema = composition::load_schema(schema)?;
            let item_count = schema.samples.len() + schema.images.len() + schema.annotations.len() + schema.observations.len();
            println!(
                "schema {} defines {} sample type(s), {} image type(s), {} annotation type(s), {} observation type(s) ({} total)",
                schema.uid,
                schema.samples.len(),
                schema.images.len(),
                schema.annotations.len(),
                schema.observations.len(),
                item_count
            );
            Ok(())
        }

        Commands::Run {
            schema,
            slides_dir,
            storage_root,
            project_name,
            dataset_name,
        } => {
            validator::require_file("schema", schema)?;
            validator::require_directory("slides_dir", slides_dir)?;
            let schema = composition::load_schema(schema)?;
            let (engine, _metrics) = composition::build_engine(schema, storage_root, cli.config.as_deref())?;

            let root_schema_uid = engine.registry.root().uid.clone();
            let dataset = Dataset::new(dataset_name.clone(), root_schema_uid.clone());
            let project: Project = engine.create_project(project_name.clone(), root_schema_uid, dataset.uid.clone());

            let summary = demo::run(&engine, project, dataset, slides_dir).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }

        Commands::Metrics => {
            let metrics = slidetap_app::MetricsService::new()?;
            println!("{}", metrics.gather_as_text()?);
            Ok(())
        }
    }
}
