use std::sync::Arc;

use craftmind_nexus::{
    AppState, Config,
    repositories::token::FileTokenStore,
    routes::router::Resolution,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: craftmind-nexus [status | login <username> [password] | logout | refresh | open <path> | menu]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let tokens = Arc::new(FileTokenStore::new(&config.state_dir));
    let app = AppState::new(&config, tokens)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    let start = app.start().await;

    match command {
        "status" => {
            match app.session.snapshot().user {
                Some(user) => println!(
                    "signed in as {} ({}, {})",
                    user.display_name,
                    user.username,
                    user.role.label()
                ),
                None => println!("signed out"),
            }
            print_resolution(&start);
        }
        "login" => {
            let Some(username) = args.get(1) else {
                anyhow::bail!(USAGE);
            };
            let password = match args.get(2) {
                Some(password) => password.clone(),
                None => std::env::var("CRAFTMIND_PASSWORD")
                    .map_err(|_| anyhow::anyhow!("pass the password as an argument or set CRAFTMIND_PASSWORD"))?,
            };
            match app.login(username, &password).await {
                Ok((user, resolution)) => {
                    println!("welcome, {} ({})", user.display_name, user.role.label());
                    print_resolution(&resolution);
                }
                Err(e) => {
                    eprintln!("login failed: {}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
        "logout" => {
            let resolution = app.logout().await;
            print_resolution(&resolution);
        }
        "refresh" => {
            let user = app.auth.refresh().await?;
            println!("profile refreshed: {} ({})", user.display_name, user.role.label());
            if user.role == craftmind_nexus::models::user::Role::Student {
                let progress = user.progress();
                println!(
                    "level {} - {} xp into level ({}%)",
                    progress.level, progress.xp_in_level, progress.percent
                );
            }
        }
        "open" => {
            let Some(path) = args.get(1) else {
                anyhow::bail!(USAGE);
            };
            let resolution = app.navigate(path).await;
            print_resolution(&resolution);
        }
        "menu" => {
            let items = app.menu();
            if items.is_empty() {
                println!("signed out: no menu");
            }
            for item in items {
                println!("{:<28} {}", item.path, item.label);
            }
        }
        _ => anyhow::bail!(USAGE),
    }

    for toast in app.toasts.drain() {
        println!("[{:?}] {}", toast.level, toast.message);
    }

    Ok(())
}

fn print_resolution(resolution: &Resolution) {
    match resolution {
        Resolution::Loading => println!("still loading"),
        Resolution::Render {
            path,
            view,
            redirects,
        } => {
            if redirects.is_empty() {
                println!("at {} ({:?})", path, view);
            } else {
                println!("at {} ({:?}) via {}", path, view, redirects.join(" -> "));
            }
        }
    }
}
