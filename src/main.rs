use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use postline::api::types::{CreatePostData, RegisterData};
use postline::api::ApiClient;
use postline::app::BlogApp;
use postline::config::Config;
use postline::identity::{FileTokenStore, Role, SessionStore};
use postline::query::QueryData;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let cfg = Config::from_env();
    info!(api_base = %cfg.api_base, state_dir = %cfg.state_dir.display(), "postline starting");

    let sessions = Arc::new(SessionStore::new(Arc::new(FileTokenStore::new(&cfg.state_dir))));
    sessions.init();
    let api = Arc::new(ApiClient::new(&cfg.api_base, sessions.clone())?);
    let app = BlogApp::new(api, sessions.clone(), cfg.page_size);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = args.first().map(String::as_str).unwrap_or("help");
    match cmd {
        "login" => {
            let (email, password) = (arg(&args, 1)?, arg(&args, 2)?);
            let sess = app.login(&email, &password).await?;
            println!("logged in as {} ({:?})", sess.username, sess.role);
        }
        "register" => {
            let data = RegisterData {
                username: arg(&args, 1)?,
                email: arg(&args, 2)?,
                password: arg(&args, 3)?,
                role: if args.get(4).map(String::as_str) == Some("admin") { Role::Admin } else { Role::User },
            };
            let sess = app.register(data).await?;
            println!("registered and logged in as {}", sess.username);
        }
        "logout" => {
            app.logout();
            println!("logged out");
        }
        "whoami" => match app.sessions().current() {
            Some(s) => println!("{} (user {}, {:?}), token expires at {}", s.username, s.user_id, s.role, s.expires_at),
            None => println!("anonymous"),
        },
        "posts" | "all" => {
            let page: u32 = args.get(1).and_then(|v| v.parse().ok()).unwrap_or(1);
            let entry = if cmd == "posts" { app.my_posts(page).await? } else { app.all_posts(page).await? };
            match entry.data.as_ref().and_then(QueryData::as_page) {
                Some(pg) => {
                    for post in &pg.data {
                        println!("#{:<5} [{}] {}", post.id, post.user_id, post.title);
                    }
                    println!("page {}/{} ({} posts)", pg.page, pg.total_pages, pg.total_posts);
                }
                None => println!("no data ({:?})", entry.status),
            }
        }
        "stats" => {
            let accounts = app.accounts_total().await?;
            let posts = app.posts_total().await?;
            let scalar = |e: &postline::query::QueryEntry| {
                e.data.as_ref().and_then(QueryData::as_total).unwrap_or(0)
            };
            println!("accounts: {}", scalar(&accounts));
            println!("posts:    {}", scalar(&posts));
        }
        "view" => {
            let id: i64 = arg(&args, 1)?.parse()?;
            let post = app.view_post(id).await?;
            println!("#{} {} (by user {})\n{}", post.id, post.title, post.user_id, post.body);
        }
        "create" => {
            let data = CreatePostData {
                title: arg(&args, 1)?,
                body: arg(&args, 2)?,
                tags: args.iter().skip(3).cloned().collect(),
            };
            let post = app.create_post(data).await?;
            println!("created post #{}", post.id);
        }
        "edit" => {
            let id: i64 = arg(&args, 1)?.parse()?;
            let current = app.view_post(id).await?;
            let data = CreatePostData {
                title: arg(&args, 2)?,
                body: arg(&args, 3)?,
                tags: args.iter().skip(4).cloned().collect(),
            };
            let post = app.edit_post(id, current.user_id, data).await?;
            println!("edited post #{}", post.id);
        }
        "delete" => {
            let id: i64 = arg(&args, 1)?.parse()?;
            let current = app.view_post(id).await?;
            app.delete_post(id, current.user_id).await?;
            println!("deleted post #{}", id);
        }
        _ => {
            println!("usage: postline <command>");
            println!("  login <email> <password>");
            println!("  register <username> <email> <password> [admin]");
            println!("  logout | whoami | stats");
            println!("  posts [page] | all [page] | view <id>");
            println!("  create <title> <body> [tags...]");
            println!("  edit <id> <title> <body> [tags...]");
            println!("  delete <id>");
        }
    }
    Ok(())
}

fn arg(args: &[String], i: usize) -> anyhow::Result<String> {
    args.get(i)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing argument {}", i))
}
