use crate::infra::{build_appcenter, InProcessWorkflowEngine};
use appcenter::business::application::ApplicationServiceError;
use appcenter::business::demand::{DemandType, DemandTypeIdService, DEMAND_WORKFLOW_RESOURCE_TYPE};
use appcenter::error::AppError;
use appcenter::modules::{FastDeployApplicationData, SourcesData};
use appcenter::rbac::InMemoryResourceTypeRegistry;
use appcenter::workflow::{WorkflowId, WorkflowResource};
use appcenter::{
    Application, ApplicationFilter, Database, DemandTypeRepository, Environment, NewDemand,
    RepositoryError,
};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_DEMAND_TYPE: &str = "DEMO_DEPLOY";
const DEMO_WORKFLOW: WorkflowId = WorkflowId(1);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// SQLite file to use. Defaults to a throwaway in-memory database.
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Code of the sample application (reused when it already exists).
    #[arg(long, default_value = "DEMO")]
    pub(crate) code: String,
    /// JSON payload of the submitted demand.
    #[arg(long, value_parser = parse_payload)]
    pub(crate) payload: Option<Value>,
}

fn parse_payload(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("failed to parse '{raw}' as JSON ({err})"))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let db = match &args.database {
        Some(path) => Database::open(path)?,
        None => Database::in_memory()?,
    };
    let engine = Arc::new(InProcessWorkflowEngine::default());
    let registry = InMemoryResourceTypeRegistry::default();
    let appcenter = build_appcenter(&db, Arc::clone(&engine), &registry);

    let demand_types = appcenter.demands.demand_types().repository();
    if demand_types.find(DEMO_DEMAND_TYPE)?.is_none() {
        demand_types.insert(
            &DemandType::new(DEMO_DEMAND_TYPE, "Demo deployment").with_workflow(DEMO_WORKFLOW),
        )?;
    }

    let application = match appcenter.applications.get_by_code(&args.code) {
        Ok(existing) => existing,
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {
            appcenter.applications.create(
                Application {
                    description: "Sample application created by the demo".to_string(),
                    front_url: "https://demo.example.org".to_string(),
                    ..Application::new(args.code.clone(), "Demo application")
                }
                .with_environments([Environment::Development, Environment::Qualification]),
            )?
        }
        Err(err) => return Err(err.into()),
    };

    println!("Application center demo");
    println!(
        "  Application {} ({}) id={} environments={}",
        application.code,
        application.name,
        application.id,
        application
            .environments
            .iter()
            .map(|environment| environment.prefix())
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut sources = SourcesData {
        site_repository: Some(format!("https://scm.example.org/{}/site", application.code)),
        ..SourcesData::default()
    };
    sources.add_plugin_repository(format!("https://scm.example.org/{}/plugin", application.code));
    appcenter
        .applications
        .save_data_subset(application.id, &sources)?;

    let fastdeploy = FastDeployApplicationData {
        code: application.code.clone(),
        name: application.name.clone(),
        web_app: format!("site-{}", application.code.to_lowercase()),
        url_site: application.front_url.clone(),
        workgroup: "demo".to_string(),
    };
    match fastdeploy.validate() {
        Ok(()) => {
            appcenter
                .applications
                .save_data_subset(application.id, &fastdeploy)?;
        }
        Err(errors) => {
            println!("  Fast deploy settings not saved:");
            for error in errors {
                println!("    - {error} ({})", error.message_key);
            }
        }
    }

    let stored = appcenter.applications.get(application.id)?;
    println!(
        "  Application data: {}",
        stored.application_data.as_deref().unwrap_or("<none>")
    );

    let payload = args
        .payload
        .unwrap_or_else(|| serde_json::json!({ "x": 1 }));
    let demand = appcenter
        .demands
        .save(&NewDemand::new(DEMO_DEMAND_TYPE, payload), &application)?;
    let resource = WorkflowResource::new(
        application.id.0,
        DEMAND_WORKFLOW_RESOURCE_TYPE,
        DEMO_WORKFLOW,
    );
    println!(
        "  Demand {} ({}) created at {}, automatic action runs: {}",
        demand.id,
        demand.demand_type,
        demand.creation_date.to_rfc3339(),
        engine.automatic_runs(&resource)
    );

    let payloads: Vec<Value> = appcenter
        .demands
        .list_by_application_and_type(application.id, DEMO_DEMAND_TYPE)?;
    println!("  Stored {DEMO_DEMAND_TYPE} payloads:");
    for payload in payloads {
        println!("    {payload}");
    }

    let titles = DemandTypeIdService::new(Arc::clone(demand_types)).resource_id_list()?;
    println!("  Permission resources:");
    for key in registry.keys() {
        println!("    {key}");
    }
    for item in titles {
        println!("    {} -> {}", item.code, item.name);
    }

    let known = appcenter
        .applications
        .search(&ApplicationFilter::default())?;
    println!("  Applications in store: {}", known.len());
    Ok(())
}
