use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use idol_stage::api::concerts::CategorizedConcerts;
use idol_stage::api::ApiClient;
use idol_stage::app::ports::{CollectionSource, ImageSource, PerformanceSource, TicketSink};
use idol_stage::calendar::{CalendarController, MonthKey};
use idol_stage::common::constants::CONCERT_PAGE_SIZE;
use idol_stage::common::types::LoginRequest;
use idol_stage::config::Config;
use idol_stage::infra::file_sink::DirectoryTicketSink;
use idol_stage::infra::http_client::AssetImageSource;
use idol_stage::logging;
use idol_stage::server::{start_server, PreviewState};
use idol_stage::session::{FileSessionStore, SessionStore};
use idol_stage::ticket::export::TicketExporter;
use idol_stage::ticket::TicketFace;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "idol_stage")]
#[command(about = "Virtual concert calendar and collectible ticket tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Print a month of performances
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// 1-12
        #[arg(long)]
        month: Option<u32>,
        /// Select a day and list only its performances
        #[arg(long)]
        day: Option<u32>,
    },
    /// List collected tickets (defaults to the logged-in user)
    Collection {
        #[arg(long)]
        user: Option<i64>,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Export a collected ticket as PNG
    Export {
        #[arg(long)]
        user: Option<i64>,
        #[arg(long)]
        concert: i64,
        /// front, back or both
        #[arg(long, default_value = "both")]
        face: String,
    },
    /// List the logged-in user's characters
    Characters,
    /// List the logged-in user's concerts, the imminent ones, or a page of all concerts
    Concerts {
        #[arg(long)]
        imminent: bool,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Run the preview HTTP server
    Serve {
        /// host:port, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
}

fn build_client(config: &Config) -> anyhow::Result<Arc<ApiClient>> {
    let session = FileSessionStore::open(&config.session.dir)
        .with_context(|| format!("opening session in {}", config.session.dir.display()))?;
    let session: Arc<dyn SessionStore> = Arc::new(session);
    Ok(Arc::new(ApiClient::new(&config.api, session)?))
}

fn build_exporter(config: &Config) -> anyhow::Result<TicketExporter> {
    let images: Arc<dyn ImageSource> =
        Arc::new(AssetImageSource::new(Duration::from_secs(config.api.timeout_seconds))?);
    let sink: Arc<dyn TicketSink> = Arc::new(DirectoryTicketSink::new(config.ticket.output_dir.clone()));
    Ok(TicketExporter::from_config(&config.ticket, images, sink)?)
}

fn parse_faces(face: &str) -> anyhow::Result<Vec<TicketFace>> {
    if face.eq_ignore_ascii_case("both") {
        return Ok(vec![TicketFace::Front, TicketFace::Back]);
    }
    Ok(vec![face.parse()?])
}

fn user_or_session(client: &ApiClient, user: Option<i64>) -> anyhow::Result<i64> {
    match user {
        Some(id) => Ok(id),
        None => client.current_user_id().context("pass --user or log in first"),
    }
}

fn print_concerts(split: &CategorizedConcerts) {
    for (title, list) in [("Upcoming", &split.upcoming), ("Ongoing", &split.ongoing), ("Past", &split.past)] {
        println!("\n{} ({})", title, list.len());
        for c in list {
            println!("   #{} {} {} {}-{}", c.id, c.name, c.concert_date, c.start_time, c.end_time);
        }
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Login { email, password } => {
            let client = build_client(&config)?;
            match client.login(&LoginRequest { email, password }).await {
                Ok(info) => println!("✅ Logged in as {}", info.display_name.or(info.email).unwrap_or_default()),
                Err(e) => {
                    error!("Login failed: {}", e);
                    println!("❌ Login failed: {}", e);
                }
            }
        }
        Commands::Logout => {
            build_client(&config)?.logout()?;
            println!("✅ Logged out");
        }
        Commands::Calendar { year, month, day } => {
            let client = build_client(&config)?;
            let today = Local::now().date_naive();
            let mut calendar = CalendarController::new(today);
            let request = match (year, month) {
                (None, None) => calendar.mount(today),
                (y, m) => {
                    let m = m.unwrap_or(today.month());
                    anyhow::ensure!((1..=12).contains(&m), "--month must be 1-12");
                    calendar.go_to(MonthKey::new(y.unwrap_or(today.year()), m - 1)?)
                }
            };
            calendar.load(&*client, request).await;
            if let Some(day) = day {
                calendar.select_day(day)?;
            }

            println!("\n📅 {}", calendar.key().label());
            println!("{}", calendar.render_grid());
            let selected = calendar.selected_performances();
            println!("\n{} performance(s)", selected.len());
            for p in selected {
                println!("   #{} {} {} {} @ {}", p.id, p.name, p.concert_date, p.start_time, p.stage_name);
            }
        }
        Commands::Collection { user, page } => {
            let client = build_client(&config)?;
            let user_id = user_or_session(&client, user)?;
            let page = client.collection_page(user_id, page).await;
            println!("\n🎫 Collection of user {} (page {} of {})", user_id, page.number + 1, page.total_pages.max(1));
            for item in &page.content {
                println!(
                    "   #{} {} {} {} by {}",
                    item.concert_id,
                    item.concert_name,
                    item.display_date(),
                    item.display_time(),
                    item.artist
                );
            }
            if page.content.is_empty() {
                println!("   (empty)");
            }
        }
        Commands::Export { user, concert, face } => {
            let client = build_client(&config)?;
            let user_id = user_or_session(&client, user)?;
            let faces = parse_faces(&face)?;
            let exporter = build_exporter(&config)?;
            let items = client.collection(user_id).await?;
            let item = items
                .iter()
                .find(|i| i.concert_id == concert)
                .with_context(|| format!("concert {} is not in the collection of user {}", concert, user_id))?;
            for face in faces {
                match exporter.capture_ticket(item, face).await {
                    Some(path) => println!("✅ Saved {} to {}", face, path.display()),
                    None => println!("❌ Could not export the {} of concert {}", face, concert),
                }
            }
        }
        Commands::Characters => {
            let client = build_client(&config)?;
            let user_id = client.current_user_id()?;
            let characters = client.characters_by_user(user_id).await?;
            println!("\n🧑‍🎤 {} character(s)", characters.len());
            for c in characters {
                let mark = if c.active { "●" } else { "○" };
                println!("   {} #{} {} - {}", mark, c.id, c.name, c.description);
            }
        }
        Commands::Concerts { imminent, page } => {
            let client = build_client(&config)?;
            if let Some(page) = page {
                let listing = client.list_concerts(page, CONCERT_PAGE_SIZE).await?;
                println!("\n🎤 Concerts (page {} of {})", listing.number + 1, listing.total_pages.max(1));
                for c in listing.content {
                    println!("   #{} {} {} {}", c.id, c.name, c.concert_date, c.start_time);
                }
            } else if imminent {
                let concerts = client.imminent_concerts().await?;
                println!("\n⏰ {} imminent concert(s)", concerts.len());
                for c in concerts {
                    println!("   #{} {} {} {}", c.id, c.name, c.concert_date, c.start_time);
                }
            } else {
                let split = client.my_concerts(Local::now().naive_local()).await?;
                print_concerts(&split);
                if client.check_concert_registration().await? {
                    println!("\n✅ You can register a new concert");
                }
            }
        }
        Commands::Serve { bind } => {
            let client = build_client(&config)?;
            let state = PreviewState {
                performances: client.clone() as Arc<dyn PerformanceSource>,
                collections: client as Arc<dyn CollectionSource>,
                exporter: Arc::new(build_exporter(&config)?),
            };
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            start_server(state, &bind).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load().context("loading config.toml")?;
    info!("Using backend {}", config.api.base_url);

    run(cli, config).await
}
