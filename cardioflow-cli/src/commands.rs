//! CLI subcommand handlers.

use crate::{Commands, ConfigAction};
use cardioflow_ml::config::CONFIG_FILE_NAME;
use cardioflow_ml::pipeline::{
    EvaluationSummary, IngestionSummary, TrainingSummary, TransformSummary,
};
use cardioflow_ml::store::keys;
use cardioflow_ml::{
    AppContext, ArtifactStore, DataIngestion, DataTransformation, DataValidation, FsArtifactStore,
    ModelEvaluation, ModelTraining, PipelineConfig, PipelineError, run_stage, select_predictor,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Handle a CLI subcommand against the workspace's artifact store.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config: PipelineConfig,
) -> anyhow::Result<()> {
    let store = FsArtifactStore::new(workspace);
    match command {
        Commands::Ingest => {
            run_stage(&DataIngestion, &store)?;
        }
        Commands::Validate { .. } => {
            let report = run_stage(&DataValidation::from_config(&config), &store)?;
            println!("{}", report.summary());
        }
        Commands::Transform => {
            run_stage(&DataTransformation::from_config(&config), &store)?;
        }
        Commands::Train => {
            run_stage(&ModelTraining::from_config(&config), &store)?;
        }
        Commands::Evaluate => {
            let summary = run_stage(&ModelEvaluation::from_config(&config), &store)?;
            println!("{}", serde_json::to_string_pretty(&summary.metrics)?);
        }
        Commands::Run { skip_train, .. } => {
            let report = run_pipeline(&store, &config, skip_train)?;
            println!("{}", serde_json::to_string_pretty(&report.evaluation.metrics)?);
        }
        Commands::Serve { .. } => {
            let ctx = AppContext::new(select_predictor(&store))?;
            let serving = &config.serving;
            cardioflow_ml::serving::serve(Arc::new(ctx), &serving.host, serving.port).await?;
        }
        Commands::Config { action } => handle_config(action, workspace, &config)?,
    }
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            let toml_str = toml::to_string_pretty(&PipelineConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!("Created default configuration at: {}", config_path.display());
        }
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}

/// Outputs of one full pipeline run.
#[derive(Debug)]
pub(crate) struct RunReport {
    pub ingestion: IngestionSummary,
    pub transform: TransformSummary,
    /// `None` when training was skipped.
    pub training: Option<TrainingSummary>,
    pub evaluation: EvaluationSummary,
}

/// Ingest, validate, transform, train and evaluate in order, stopping at the
/// first stage that fails.
pub(crate) fn run_pipeline(
    store: &dyn ArtifactStore,
    config: &PipelineConfig,
    skip_train: bool,
) -> Result<RunReport, PipelineError> {
    let ingestion = run_stage(&DataIngestion, store)?;
    run_stage(&DataValidation::from_config(config), store)?;
    let transform = run_stage(&DataTransformation::from_config(config), store)?;
    let training = if skip_train {
        info!(model = %store.describe(keys::MODEL), "Skipping training");
        None
    } else {
        Some(run_stage(&ModelTraining::from_config(config), store)?)
    };
    let evaluation = run_stage(&ModelEvaluation::from_config(config), store)?;

    info!(
        rows = ingestion.rows,
        features = transform.feature_columns,
        train_accuracy = training.as_ref().map(|t| t.train_accuracy),
        accuracy = evaluation.metrics.accuracy,
        f1_score = evaluation.metrics.f1_score,
        "Pipeline finished"
    );
    Ok(RunReport {
        ingestion,
        transform,
        training,
        evaluation,
    })
}
