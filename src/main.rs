use clap::{Args, Parser, Subcommand};
use mandi_connect::models::auth::{BuyerSignupRequest, FarmerSignupRequest, LoginRequest, SignupRequest};
use mandi_connect::models::catalog::AddCropRequest;
use mandi_connect::models::listing::{CropListingForm, DemandForm};
use mandi_connect::models::role::Role;
use mandi_connect::models::route::Route;
use mandi_connect::service::auth::AuthService;
use mandi_connect::service::catalog::CatalogService;
use mandi_connect::service::dashboard::{DashboardEntry, Tab, open_dashboard};
use mandi_connect::service::identity::{CachePolicy, IdentityResolver};
use mandi_connect::service::listing::{ListingSubmitter, upload_crop_photo};
use mandi_connect::service::scope::ScreenScope;
use mandi_connect::service::session::{Entry, SessionResolver};
use mandi_connect::{Alert, AppContext, AppError, Config, init_tracing};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Mandi Connect marketplace client
#[derive(Parser, Debug)]
#[command(name = "mandi", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = mandi_connect::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    role: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Buyer screens
    Buyer {
        #[command(subcommand)]
        command: BuyerCommand,
    },
    /// Farmer screens
    Farmer {
        #[command(subcommand)]
        command: FarmerCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BuyerCommand {
    /// Register a buyer account
    Signup {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        company: String,
    },
    /// Post a crop demand
    Demand(DemandArgs),
    #[command(flatten)]
    Common(CommonCommand),
}

#[derive(Subcommand, Debug)]
enum FarmerCommand {
    /// Register a farmer account
    Signup {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        farm_address: String,
    },
    /// Offer a crop for sale
    ListCrop(CropListingArgs),
    /// Upload a crop photo and print its URL
    Upload { path: PathBuf },
    #[command(flatten)]
    Common(CommonCommand),
}

#[derive(Subcommand, Debug)]
enum CommonCommand {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Remove the stored session
    Logout,
    /// Resolve the profile behind the stored session
    Whoami {
        /// Ignore the cached profile id and re-match against the server
        #[arg(long)]
        refresh: bool,
    },
    /// Open the role dashboard
    Dashboard {
        #[arg(long)]
        tab: Option<String>,
    },
    /// List crops and markets
    Catalog,
    /// Add a crop to the catalog
    AddCrop {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        variety: String,
        #[arg(long, default_value = "")]
        grade: String,
    },
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    mobile: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
}

#[derive(Args, Debug)]
struct DemandArgs {
    #[arg(long)]
    crop: Option<String>,
    #[arg(long)]
    market: Option<String>,
    #[arg(long, default_value = "")]
    quantity: String,
    #[arg(long, default_value = "quintal")]
    unit: String,
    #[arg(long, default_value = "")]
    price: String,
}

#[derive(Args, Debug)]
struct CropListingArgs {
    #[arg(long)]
    crop: Option<String>,
    #[arg(long)]
    market: Option<String>,
    #[arg(long, default_value = "")]
    quantity: String,
    #[arg(long, default_value = "quintal")]
    unit: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long)]
    photo_url: Option<String>,
}

/// What a finished screen action hands back to the terminal.
enum Outcome {
    Navigate(Route, Option<String>),
    Show(serde_json::Value),
}

fn show<T: Serialize>(value: &T) -> Result<Outcome, AppError> {
    Ok(Outcome::Show(serde_json::to_value(value)?))
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load_from(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    init_tracing(&level, config.logging.json_format);

    let ctx = match AppContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(err) => return report(&err),
    };

    let scope = ScreenScope::new("cli");
    let handle = scope.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    match scope.run(dispatch(&ctx, cli.role)).await {
        Ok(Outcome::Navigate(route, message)) => {
            if let Some(message) = message {
                eprintln!("{}", Alert::success(message));
            }
            println!("{route}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Show(value)) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{value}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => report(&err),
    }
}

fn report(err: &AppError) -> ExitCode {
    error!(error = ?err, "command failed");
    eprintln!("{}", Alert::from(err));
    ExitCode::FAILURE
}

async fn dispatch(ctx: &AppContext, command: RoleCommand) -> Result<Outcome, AppError> {
    match command {
        RoleCommand::Buyer { command } => match command {
            BuyerCommand::Signup { account, company } => {
                let request = SignupRequest::Buyer(BuyerSignupRequest {
                    name: account.name,
                    email: account.email,
                    mobile: account.mobile,
                    password: account.password,
                    company_name: company,
                    city: account.city,
                    state: account.state,
                });
                let outcome = AuthService::new(ctx).signup(request).await?;
                Ok(Outcome::Navigate(outcome.route, outcome.message))
            }
            BuyerCommand::Demand(args) => {
                let mut session = SessionResolver::new(&ctx.sessions).require(Role::Buyer).await?;
                let buyer = IdentityResolver::new(ctx).resolve(&mut session, CachePolicy::PreferCache).await?;
                let form = DemandForm {
                    crop_id: args.crop,
                    market_id: args.market,
                    quantity: args.quantity,
                    unit: args.unit,
                    expected_price: args.price,
                };
                let submitted = ListingSubmitter::new().submit_demand(ctx, &session, &buyer.identity, &form).await?;
                Ok(Outcome::Navigate(submitted.route, submitted.created.message))
            }
            BuyerCommand::Common(common) => run_common(ctx, Role::Buyer, common).await,
        },
        RoleCommand::Farmer { command } => match command {
            FarmerCommand::Signup { account, farm_address } => {
                let request = SignupRequest::Farmer(FarmerSignupRequest {
                    name: account.name,
                    email: account.email,
                    mobile: account.mobile,
                    password: account.password,
                    farm_address,
                    city: account.city,
                    state: account.state,
                });
                let outcome = AuthService::new(ctx).signup(request).await?;
                Ok(Outcome::Navigate(outcome.route, outcome.message))
            }
            FarmerCommand::ListCrop(args) => {
                let mut session = SessionResolver::new(&ctx.sessions).require(Role::Farmer).await?;
                let farmer = IdentityResolver::new(ctx).resolve(&mut session, CachePolicy::PreferCache).await?;
                let form = CropListingForm {
                    crop_id: args.crop,
                    market_id: args.market,
                    quantity: args.quantity,
                    unit: args.unit,
                    price: args.price,
                    photo_url: args.photo_url,
                };
                let submitted = ListingSubmitter::new()
                    .submit_crop_listing(ctx, &session, &farmer.identity, &form)
                    .await?;
                Ok(Outcome::Navigate(submitted.route, submitted.created.message))
            }
            FarmerCommand::Upload { path } => {
                let session = SessionResolver::new(&ctx.sessions).require(Role::Farmer).await?;
                let url = upload_crop_photo(ctx, &session, &path).await?;
                show(&serde_json::json!({ "url": url }))
            }
            FarmerCommand::Common(common) => run_common(ctx, Role::Farmer, common).await,
        },
    }
}

async fn run_common(ctx: &AppContext, role: Role, command: CommonCommand) -> Result<Outcome, AppError> {
    match command {
        CommonCommand::Login { email, password } => {
            let outcome = AuthService::new(ctx).login(role, LoginRequest { email, password }).await?;
            Ok(Outcome::Navigate(outcome.route, outcome.message))
        }
        CommonCommand::Logout => {
            let route = AuthService::new(ctx).logout(role).await?;
            Ok(Outcome::Navigate(route, None))
        }
        CommonCommand::Whoami { refresh } => {
            let mut session = match SessionResolver::new(&ctx.sessions).enter(role).await? {
                Entry::Redirect(route) => return Ok(Outcome::Navigate(route, None)),
                Entry::Ready(session) => session,
            };
            let policy = if refresh { CachePolicy::Refresh } else { CachePolicy::PreferCache };
            let resolved = IdentityResolver::new(ctx).resolve(&mut session, policy).await?;
            match resolved.profile {
                Some(profile) => show(&profile),
                None => show(&resolved.identity),
            }
        }
        CommonCommand::Dashboard { tab } => match open_dashboard(ctx, role, CachePolicy::PreferCache).await? {
            DashboardEntry::Redirect(route) => Ok(Outcome::Navigate(route, None)),
            DashboardEntry::Ready(mut dashboard) => {
                if let Some(tab) = tab {
                    dashboard.select(tab.parse::<Tab>()?)?;
                }
                show(&serde_json::json!({
                    "dashboard": dashboard,
                    "tabs": dashboard.tabs(),
                    "active_tab": dashboard.active_tab(),
                    "next": dashboard.primary_action().map(|route| route.to_string()),
                }))
            }
        },
        CommonCommand::Catalog => {
            let session = SessionResolver::new(&ctx.sessions).require(role).await?;
            let catalog = CatalogService::new(ctx).load(&session).await?;
            show(&catalog)
        }
        CommonCommand::AddCrop { name, variety, grade } => {
            let session = SessionResolver::new(&ctx.sessions).require(role).await?;
            let created = CatalogService::new(ctx)
                .add_crop(&session, AddCropRequest { name, variety, grade })
                .await?;
            show(&created)
        }
    }
}
