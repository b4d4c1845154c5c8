//! Status24 CLI: command-line front end for the Status24 API.
//!
//! Set STATUS24_API_URL (or API_URL) and, for tenant and admin commands,
//! STATUS24_TOKEN with a bearer token issued by the identity provider.

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use status24_api_client::session::{resolve_session, session_context};
use status24_api_client::{
    AdminConsole, ApiClient, FeedEvent, IncidentDraft, ServiceDraft, TenantConsole,
};
use status24_cli::{init_tracing, render_status_page, service_picker, TerminalNotifier};
use status24_core::models::{IncidentStatus, ServiceStatus, ServiceType};
use status24_core::{PublicLookup, Resolution, Route, SessionState, View};

#[derive(Parser)]
#[command(name = "status24", about = "Status24 status page CLI")]
struct Cli {
    /// Reserved admin organization name
    #[arg(long, env = "ADMIN_ORG_NAME", default_value = "status24")]
    admin_org: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the public status page of an organization
    Status {
        /// Organization id
        org_id: String,
        /// Print the projected page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow the public status page live
    Watch {
        /// Organization id
        org_id: String,
    },
    /// List organizations that have a status page
    Orgs,
    /// Show who the token belongs to and which console it opens
    Whoami,
    /// Manage the services of your organization
    Service {
        #[command(subcommand)]
        sub: ServiceCommands,
    },
    /// Report and update incidents of your organization
    Incident {
        #[command(subcommand)]
        sub: IncidentCommands,
    },
    /// Admin console (admin organization members only)
    Admin {
        #[command(subcommand)]
        sub: AdminCommands,
    },
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// List services by name
    List,
    /// Add a service
    Add {
        #[arg(long)]
        name: String,
        /// website, api, db or any other kind
        #[arg(long = "type")]
        service_type: String,
        #[arg(long, default_value = "operational")]
        status: ServiceStatus,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change the status of a service
    Update {
        service_id: String,
        #[arg(long)]
        status: ServiceStatus,
    },
    /// Delete a service
    Delete { service_id: String },
}

#[derive(Subcommand)]
enum IncidentCommands {
    /// Report an incident
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "investigating")]
        status: IncidentStatus,
        /// Start of the disruption (RFC 3339), defaults to now
        #[arg(long)]
        datetime: Option<DateTime<Utc>>,
        /// Affected service id, repeatable
        #[arg(long = "affects")]
        affected_services: Vec<String>,
    },
    /// Change the status of an incident and append an update message
    Update {
        incident_id: String,
        #[arg(long)]
        status: IncidentStatus,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List organizations known to the identity provider
    Orgs,
    /// Create a user
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Create an organization
    CreateOrg {
        #[arg(long)]
        name: String,
    },
    /// Add a user to an organization
    AddUser {
        #[arg(long)]
        org: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Resolves the session and returns the console view it opens.
async fn signed_in_view(client: &ApiClient, admin_org: &str) -> anyhow::Result<View> {
    let mut context = session_context(client, admin_org);
    resolve_session(client, &mut context).await?;

    match context.resolve(&Route::Home, PublicLookup::Pending) {
        Resolution::Render(view) => Ok(view),
        Resolution::Redirect(Route::SignIn) => bail!("Not signed in. Set STATUS24_TOKEN"),
        other => Err(anyhow!("Unexpected session state: {:?}", other)),
    }
}

async fn tenant_console(
    client: &ApiClient,
    admin_org: &str,
) -> anyhow::Result<TenantConsole<TerminalNotifier>> {
    match signed_in_view(client, admin_org).await? {
        View::Tenant { organization } => Ok(TenantConsole::new(
            client.clone(),
            organization.id,
            TerminalNotifier,
        )),
        View::Admin => bail!("The admin organization has no services of its own"),
        _ => bail!("User is not a member of any organization"),
    }
}

async fn admin_console(
    client: &ApiClient,
    admin_org: &str,
) -> anyhow::Result<AdminConsole<TerminalNotifier>> {
    match signed_in_view(client, admin_org).await? {
        View::Admin => Ok(AdminConsole::new(client.clone(), TerminalNotifier)),
        _ => bail!("User is not authorized. Admin access required."),
    }
}

async fn watch(client: &ApiClient, org_id: &str) -> anyhow::Result<()> {
    let mut feed = client.watch_status(org_id).await?;

    loop {
        tokio::select! {
            event = feed.next() => match event {
                Some(FeedEvent::Status(page)) => {
                    println!("--- {} ---", Utc::now().format("%H:%M:%S"));
                    print!("{}", render_status_page(&page));
                }
                Some(FeedEvent::NotFound) => {
                    println!("Organization {} not found, waiting for it to appear", org_id);
                }
                None => {
                    tracing::info!("Feed closed by server");
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::from_env()
        .context("Failed to create API client. Set STATUS24_API_URL (or API_URL)")?;

    match cli.command {
        Commands::Status { org_id, json } => {
            let page = client
                .status_page(&org_id)
                .await?
                .ok_or_else(|| anyhow!("Organization {} not found", org_id))?;
            if json {
                print_json(&page)?;
            } else {
                print!("{}", render_status_page(&page));
            }
        }
        Commands::Watch { org_id } => watch(&client, &org_id).await?,
        Commands::Orgs => {
            for id in client.organizations_list().await? {
                let name = client
                    .org_details(&id)
                    .await?
                    .and_then(|details| details.name)
                    .unwrap_or_default();
                println!("{:<36} {}", id, name);
            }
        }
        Commands::Whoami => {
            let mut context = session_context(&client, &cli.admin_org);
            resolve_session(&client, &mut context).await?;
            match context.state() {
                SessionState::SignedIn(session) => {
                    println!("user: {}", session.user_id);
                    match context.view_for(session) {
                        View::Admin => println!("console: admin"),
                        View::Tenant { organization } => {
                            println!("console: tenant of {} ({})", organization.name, organization.id)
                        }
                        _ => println!("console: none, user has no organization"),
                    }
                }
                _ => println!("Not signed in"),
            }
        }
        Commands::Service { sub } => {
            let console = tenant_console(&client, &cli.admin_org).await?;
            match sub {
                ServiceCommands::List => {
                    let page = client
                        .status_page(console.organization_id())
                        .await?
                        .ok_or_else(|| anyhow!("Organization has no status page yet"))?;
                    for service in service_picker(&page) {
                        println!("{:<24} {:<28} {}", service.id, service.name, service.status.label());
                    }
                }
                ServiceCommands::Add {
                    name,
                    service_type,
                    status,
                    description,
                } => {
                    let service = console
                        .add_service(ServiceDraft {
                            name,
                            service_type: Some(ServiceType::from(service_type)),
                            status: Some(status),
                            description,
                        })
                        .await?;
                    println!("{}", service.id);
                }
                ServiceCommands::Update { service_id, status } => {
                    console.stage_service_status(&service_id, status);
                    console.save_service_status(&service_id).await?;
                }
                ServiceCommands::Delete { service_id } => {
                    console.delete_service(&service_id).await?;
                }
            }
        }
        Commands::Incident { sub } => {
            let console = tenant_console(&client, &cli.admin_org).await?;
            match sub {
                IncidentCommands::Add {
                    title,
                    description,
                    status,
                    datetime,
                    affected_services,
                } => {
                    let incident = console
                        .add_incident(IncidentDraft {
                            title,
                            description,
                            status: Some(status),
                            datetime: Some(datetime.unwrap_or_else(Utc::now)),
                            affected_services,
                        })
                        .await?;
                    println!("{}", incident.id);
                }
                IncidentCommands::Update {
                    incident_id,
                    status,
                    message,
                } => {
                    console.stage_incident_update(&incident_id, status, &message);
                    console.save_incident_update(&incident_id).await?;
                }
            }
        }
        Commands::Admin { sub } => {
            let console = admin_console(&client, &cli.admin_org).await?;
            match sub {
                AdminCommands::Orgs => {
                    for org in console.organizations().await? {
                        println!("{:<36} {}", org.id, org.name);
                    }
                }
                AdminCommands::CreateUser { email, name } => {
                    print_json(&console.create_user(&email, &name).await?)?;
                }
                AdminCommands::CreateOrg { name } => {
                    print_json(&console.create_org(&name).await?)?;
                }
                AdminCommands::AddUser { org, email, name } => {
                    print_json(&console.add_user_to_org(&org, &email, &name).await?)?;
                }
            }
        }
    }

    Ok(())
}
