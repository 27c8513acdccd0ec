//! orthanc-lazy - browse an Orthanc archive from the command line.

use std::process::ExitCode;

use clap::Parser;
use futures::TryStreamExt;
use serde_json::{json, Value};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orthanc_lazy::{
    Cli, Command, Instance, Orthanc, Patient, Resource, ResourceError, ResourceKind, Series,
    Study,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.connection.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let orthanc = match Orthanc::connect(&cli.connection) {
        Ok(orthanc) => orthanc,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(host = %cli.connection.host, "client ready");

    match run(&orthanc, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(orthanc: &Orthanc, command: Command) -> Result<(), ResourceError> {
    match command {
        Command::Patient { id } => print_json(&describe_patient(&orthanc.patient(id)).await?),
        Command::Study { id } => print_json(&describe_study(&orthanc.study(id)).await?),
        Command::Series { id } => print_json(&describe_series(&orthanc.series(id)).await?),
        Command::Instance { id } => print_json(&describe_instance(&orthanc.instance(id)).await?),
        Command::Changes { change_type } => {
            let mut ids = orthanc.new_data().ids(change_type);
            while let Some(id) = ids.try_next().await? {
                println!("{}", id);
            }
        }
        Command::Modalities => {
            for name in orthanc.modalities().await? {
                println!("{}", name);
            }
        }
        Command::Anonymize { study, obscure_id } => {
            let response = orthanc.study(study).anonymize(&obscure_id).await?;
            print_json(&response);
        }
        Command::Send { study, modality } => {
            let response = orthanc.study(study).send_to(&modality).await?;
            print_json(&response);
        }
        Command::Delete { kind, id } => {
            let response = match kind {
                ResourceKind::Patient => orthanc.patient(id).delete().await?,
                ResourceKind::Study => orthanc.study(id).delete().await?,
                ResourceKind::Series => orthanc.series(id).delete().await?,
                ResourceKind::Instance => orthanc.instance(id).delete().await?,
            };
            print_json(&response);
        }
        Command::Url { path } => println!("{}", orthanc.get_url(&path)),
    }

    Ok(())
}

/// Fails with the fetch error when the resource is not on the archive.
async fn ensure_exists<R: Resource>(resource: &R) -> Result<(), ResourceError> {
    match resource.proxy().fetch_error().await {
        Some(source) => Err(ResourceError::Unavailable {
            path: resource.path().to_string(),
            source,
        }),
        None => Ok(()),
    }
}

async fn describe_patient(patient: &Patient) -> Result<Value, ResourceError> {
    ensure_exists(patient).await?;
    let studies = patient.studies().await?;

    Ok(json!({
        "id": patient.id(),
        "name": patient.name().await,
        "patient_id": patient.patient_id().await,
        "sex": patient.sex().await,
        "dob": patient.dob().await.map(|d| d.to_string()),
        "studies": studies.iter().map(|s| s.id()).collect::<Vec<_>>(),
    }))
}

async fn describe_study(study: &Study) -> Result<Value, ResourceError> {
    ensure_exists(study).await?;
    let series = study.series().await?;

    Ok(json!({
        "id": study.id(),
        "patient": study.patient().await?.id(),
        "study_id": study.study_id().await,
        "instance_uid": study.instance_uid().await,
        "description": study.description().await,
        "date": study.date().await.map(|d| d.to_string()),
        "time": study.time().await,
        "anonymized_from": study.is_anonymized().await,
        "series": series.iter().map(|s| s.id()).collect::<Vec<_>>(),
    }))
}

async fn describe_series(series: &Series) -> Result<Value, ResourceError> {
    ensure_exists(series).await?;
    let instances = series.num_instances().await?;
    let preview = if instances > 0 {
        Some(series.preview().await?)
    } else {
        None
    };

    Ok(json!({
        "id": series.id(),
        "study": series.study().await?.id(),
        "modality": series.modality().await,
        "manufacturer": series.manufacturer().await,
        "protocol": series.protocol().await,
        "sequence": series.sequence().await,
        "description": series.description().await,
        "number": series.number().await,
        "instance_uid": series.instance_uid().await,
        "date": series.date().await.map(|d| d.to_string()),
        "time": series.time().await,
        "status": series.status().await,
        "is_stable": series.is_stable().await,
        "instances": instances,
        "preview": preview,
    }))
}

async fn describe_instance(instance: &Instance) -> Result<Value, ResourceError> {
    ensure_exists(instance).await?;

    Ok(json!({
        "id": instance.id(),
        "series": instance.series().await?.id(),
        "file_uuid": instance.file_uid().await,
        "file_size": instance.filesize().await,
        "index_in_series": instance.index().await,
        "instance_number": instance.instance_number().await,
        "acquisition_number": instance.acquisition_number().await,
        "sop_instance_uid": instance.sop_instance_uid().await,
        "preview": instance.preview(),
    }))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "orthanc_lazy=debug"
    } else {
        "orthanc_lazy=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
