use crate::tui;
use colored::*;
use gram_core::api::load_comment_thread;
use gram_core::feed::Feed;
use gram_core::format::{absolute_date, image_url, relative_time};
use gram_core::mention::{open_profile, MentionText, TokenKind};
use gram_core::routes::{RecordingNavigator, Route};
use gram_core::types::{Post, PostId, SignupRequest, UserSuggestion};
use gram_core::{Config, HttpApi, SessionStore, SocialApi};
use std::sync::Arc;

/// Terminal client commands.
pub async fn run(config: Config, args: Vec<String>) -> anyhow::Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let store = SessionStore::open(&config.data_dir(), config.recent_search_limit)?;
    let api = Arc::new(HttpApi::new(&config, Some(store.clone()))?);

    match command.as_str() {
        "login" => {
            if args.len() < 3 {
                eprintln!("{}", "Usage: gram login <email> <password>".yellow());
                return Ok(());
            }
            match api.login(&args[1], &args[2]).await {
                Ok(user) => println!(
                    "{} Logged in as {}",
                    "✓".green().bold(),
                    user.user_name.cyan()
                ),
                Err(e) => fail(&format!("Login failed: {}", e)),
            }
        }
        "signup" => {
            if args.len() < 5 {
                eprintln!(
                    "{}",
                    "Usage: gram signup <username> <email> <password> <full name>".yellow()
                );
                return Ok(());
            }
            let req = SignupRequest {
                user_name: args[1].clone(),
                user_email: args[2].clone(),
                user_password: args[3].clone(),
                user_fullname: args[4..].join(" "),
            };
            match api.signup(&req).await {
                Ok(()) => println!(
                    "{} Account created, now run {}",
                    "✓".green().bold(),
                    "gram login".cyan()
                ),
                Err(e) => fail(&format!("Signup failed: {}", e)),
            }
        }
        "logout" => {
            api.logout().await?;
            println!("{} Logged out", "✓".green().bold());
        }
        "whoami" => {
            let session = api.session().await;
            match session.user {
                Some(user) if session.token.is_some() => println!(
                    "{} (#{})",
                    user.user_name.cyan().bold(),
                    user.user_id
                ),
                _ => println!("{}", "Not logged in".yellow()),
            }
        }
        "feed" => {
            require_login(&api).await?;
            show_feed(&api, &config).await;
        }
        "search" => {
            if args.len() < 2 {
                eprintln!("{}", "Usage: gram search <query>".yellow());
                return Ok(());
            }
            search(&api, &args[1..].join(" ")).await;
        }
        "open" => {
            if args.len() < 2 {
                eprintln!("{}", "Usage: gram open <@username>".yellow());
                return Ok(());
            }
            let username = args[1].trim_start_matches('@');
            open_user(&api, &store, &config, username).await?;
        }
        "recent" => {
            let recent = store.recent()?;
            if recent.is_empty() {
                println!("{}", "No recent searches".yellow());
            }
            for user in recent {
                print_user(&user);
            }
        }
        "forget" => {
            let Some(user_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram forget <userId>".yellow());
                return Ok(());
            };
            store.remove_recent(user_id)?;
            println!("{} Removed from recent searches", "✓".green().bold());
        }
        "like" => {
            require_login(&api).await?;
            let Some(post_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram like <postId>".yellow());
                return Ok(());
            };
            let (mut feed, _) = Feed::load(api.as_ref()).await;
            let outcome = feed.toggle_like(api.as_ref(), post_id).await;
            let likes = feed.post(post_id).map_or(0, |p| p.like_count);
            match outcome {
                Ok(true) => println!("{} Liked post {} ({})", "♥".red().bold(), post_id, likes),
                Ok(false) => println!("{} Unliked post {} ({})", "♡".dimmed(), post_id, likes),
                Err(e) => fail(&format!("Could not update like: {}", e)),
            }
        }
        "post" => {
            let Some(post_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram post <postId>".yellow());
                return Ok(());
            };
            show_post(&api, &config, post_id).await;
        }
        "delete-post" => {
            require_login(&api).await?;
            let Some(post_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram delete-post <postId>".yellow());
                return Ok(());
            };
            match api.delete_post(post_id).await {
                Ok(()) => println!("{} Post deleted", "✓".green().bold()),
                Err(e) => fail(&format!("Could not delete post: {}", e)),
            }
        }
        "comments" => {
            let Some(post_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram comments <postId>".yellow());
                return Ok(());
            };
            match load_comment_thread(api.as_ref(), post_id).await {
                Ok(thread) if thread.is_empty() => println!("{}", "No comments yet".dimmed()),
                Ok(thread) => {
                    for (comment, text) in thread {
                        println!(
                            "  {} {}  {}",
                            comment.user_name.cyan().bold(),
                            colorize_mentions(&text),
                            relative_time(&comment.created_at).dimmed()
                        );
                    }
                }
                Err(e) => fail(&format!("Could not load comments: {}", e)),
            }
        }
        "comment" => {
            require_login(&api).await?;
            if args.len() < 3 {
                eprintln!("{}", "Usage: gram comment <postId> <text>".yellow());
                return Ok(());
            }
            let Ok(post_id) = args[1].parse::<i64>() else {
                fail("postId must be a number");
                return Ok(());
            };
            match api.create_comment(post_id, &args[2..].join(" ")).await {
                Ok(()) => println!("{} Comment posted", "✓".green().bold()),
                Err(e) => fail(&format!("Could not post comment: {}", e)),
            }
        }
        "edit-comment" => {
            require_login(&api).await?;
            let Some(comment_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram edit-comment <commentId> <text>".yellow());
                return Ok(());
            };
            match api.update_comment(comment_id, &args[2..].join(" ")).await {
                Ok(()) => println!("{} Comment updated", "✓".green().bold()),
                Err(e) => fail(&format!("Could not update comment: {}", e)),
            }
        }
        "delete-comment" => {
            require_login(&api).await?;
            let Some(comment_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram delete-comment <commentId>".yellow());
                return Ok(());
            };
            match api.delete_comment(comment_id).await {
                Ok(()) => println!("{} Comment deleted", "✓".green().bold()),
                Err(e) => fail(&format!("Could not delete comment: {}", e)),
            }
        }
        "stories" => {
            require_login(&api).await?;
            let Some(user_id) = args.get(1).and_then(|s| s.parse::<i64>().ok()) else {
                eprintln!("{}", "Usage: gram stories <userId>".yellow());
                return Ok(());
            };
            let viewer_id = api.session().await.user_id();
            let route = tui::story_view::run(api.clone(), &config, user_id, viewer_id).await?;
            println!("{} {}", "→".dimmed(), route.path().cyan());
        }
        "compose" => {
            require_login(&api).await?;
            match tui::compose::run(api.clone(), &config).await? {
                Some(text) => {
                    println!("{}", colorize_mentions(&MentionText::new(&text)));
                    let names = gram_core::mention::mentioned_usernames(&text);
                    if !names.is_empty() {
                        println!(
                            "{} {}",
                            "mentions:".dimmed(),
                            names
                                .iter()
                                .map(|n| format!("@{}", n))
                                .collect::<Vec<_>>()
                                .join(", ")
                        );
                    }
                }
                None => println!("{}", "Discarded".dimmed()),
            }
        }
        _ => {
            eprintln!("{} Unknown command: {}", "✗".red().bold(), command.red());
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("{}", "gram".bright_magenta().bold());
    println!();
    println!("{}", "Usage:".bright_white().bold());
    println!("  {} [--api-url <url>] [--data-dir <path>] <command> [args]", "gram".cyan());
    println!();
    println!("{}", "Commands:".bright_white().bold());
    println!("  {} <user> <email> <password> <name>  Create an account", "signup".cyan());
    println!("  {} <email> <password>  Sign in", "login".cyan());
    println!("  {}                     Sign out", "logout".cyan());
    println!("  {}                     Show the signed-in user", "whoami".cyan());
    println!("  {}                       Stories row and posts", "feed".cyan());
    println!("  {} <query>             Find users", "search".cyan());
    println!("  {} <@username>           Open a profile", "open".cyan());
    println!("  {}                     Recently opened profiles", "recent".cyan());
    println!("  {} <userId>            Drop a recent entry", "forget".cyan());
    println!("  {} <postId>              Toggle like", "like".cyan());
    println!("  {} <postId>              Post with its comments", "post".cyan());
    println!("  {} <postId>       Delete your post", "delete-post".cyan());
    println!("  {} <postId>          List comments", "comments".cyan());
    println!("  {} <postId> <text>    Post a comment", "comment".cyan());
    println!("  {} <id> <text>   Edit your comment", "edit-comment".cyan());
    println!("  {} <id>        Delete your comment", "delete-comment".cyan());
    println!("  {} <userId>           Watch a user's stories", "stories".cyan());
    println!("  {}                    Write text with @mention autocomplete", "compose".cyan());
}

fn fail(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg.red());
}

async fn require_login(api: &HttpApi) -> anyhow::Result<()> {
    if api.session().await.is_authenticated() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("not logged in (redirect to {})", Route::Login))
    }
}

fn colorize_mentions(text: &MentionText) -> String {
    text.tokens()
        .iter()
        .map(|t| match t.kind {
            TokenKind::Mention => t.content.bright_blue().bold().to_string(),
            TokenKind::Text => t.content.clone(),
        })
        .collect()
}

fn print_user(user: &UserSuggestion) {
    match &user.user_fullname {
        Some(name) => println!(
            "  {} {} {}",
            format!("#{}", user.user_id).dimmed(),
            user.user_name.cyan(),
            name.dimmed()
        ),
        None => println!("  {} {}", format!("#{}", user.user_id).dimmed(), user.user_name.cyan()),
    }
}

fn print_post(post: &Post, config: &Config) {
    println!("{}", "─".repeat(60).dimmed());
    let mut header = format!(
        "{} {}",
        post.user_name.cyan().bold(),
        relative_time(&post.created_at).dimmed()
    );
    if let Some(location) = post.post_location.as_deref().filter(|l| !l.is_empty()) {
        header.push_str(&format!(" · {}", location.dimmed()));
    }
    println!("{}  {}", header, format!("#{}", post.post_id).dimmed());
    println!("  {}", image_url(&config.image_base_url, Some(&post.post_image)).underline());
    let heart = if post.is_liked { "♥".red().bold() } else { "♡".normal() };
    println!("  {} {} likes  💬 {}", heart, post.like_count, post.comment_count);
    if !post.post_caption.is_empty() {
        println!("  {}", colorize_mentions(&MentionText::new(&post.post_caption)));
    }
}

async fn show_feed(api: &HttpApi, config: &Config) {
    let (feed, notices) = Feed::load(api).await;
    for notice in notices {
        fail(&notice);
    }

    let rings = feed.story_rings();
    if !rings.is_empty() {
        let row: Vec<String> = rings
            .iter()
            .map(|r| format!("({}) {}", r.story_count, r.user_name))
            .collect();
        println!("{} {}", "Stories:".bright_white().bold(), row.join("  ").magenta());
    }
    if feed.posts.is_empty() {
        println!("{}", "No posts yet".yellow());
    }
    for post in &feed.posts {
        print_post(post, config);
    }
}

async fn show_post(api: &HttpApi, config: &Config, post_id: PostId) {
    let post = match api.get_post(post_id).await {
        Ok(post) => post,
        Err(e) if e.is_not_found() => {
            fail(&format!("Post {} does not exist (back to {})", post_id, Route::Feed));
            return;
        }
        Err(e) => {
            fail(&format!("Could not load post: {}", e));
            return;
        }
    };
    print_post(&post, config);
    println!("  {}", absolute_date(&post.created_at).dimmed());

    match load_comment_thread(api, post_id).await {
        Ok(thread) => {
            for (comment, text) in thread {
                println!(
                    "    {} {} {}",
                    format!("#{}", comment.comment_id).dimmed(),
                    comment.user_name.cyan().bold(),
                    colorize_mentions(&text)
                );
            }
        }
        Err(e) => fail(&format!("Could not load comments: {}", e)),
    }
}

async fn search(api: &HttpApi, query: &str) {
    match api.search_users(query).await {
        Ok(users) if users.is_empty() => println!("{}", "No users found".yellow()),
        Ok(users) => {
            println!("{}", format!("Users ({})", users.len()).bright_cyan().bold());
            for user in &users {
                print_user(user);
            }
        }
        Err(e) => fail(&format!("Search failed: {}", e)),
    }
}

async fn open_user(
    api: &HttpApi,
    store: &SessionStore,
    config: &Config,
    username: &str,
) -> anyhow::Result<()> {
    let mut navigator = RecordingNavigator::default();
    if !open_profile(api, &mut navigator, username).await {
        fail(&format!("No user named @{}", username));
        return Ok(());
    }
    let Some(Route::UserFeed(user_id)) = navigator.last().cloned() else {
        return Ok(());
    };

    let user = api.get_user(user_id).await?;
    store.push_recent(UserSuggestion::from(&user))?;

    println!(
        "{} {}",
        user.user_name.cyan().bold(),
        user.user_fullname.as_deref().unwrap_or("").dimmed()
    );
    match api.list_user_posts(user_id).await {
        Ok(posts) => {
            println!("{} posts", posts.len());
            for post in &posts {
                print_post(post, config);
            }
        }
        Err(e) => fail(&format!("Could not load posts: {}", e)),
    }
    Ok(())
}
