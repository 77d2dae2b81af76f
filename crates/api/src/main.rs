//! SmartCal - calendar client with an AI assistant
//!
//! Command-line entry point.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use smartcal_core::{TurnState, TurnStatus, VoiceOutcome, VoiceStatus};
use smartcal_domain::{
    EventDraft, EventItem, EventListQuery, EventType, NotificationQuery, OperationAction,
    OperationLogQuery, PageQuery, RegisterRequest, User, UserStatus,
};
use smartcal_infra::{config, FileAudioInput};
use smartcal_lib::utils::logging::init_logging;
use smartcal_lib::commands::NextStep;
use smartcal_lib::{commands, AppContext};
use tracing::debug;

const USAGE: &str = "\
usage: smartcal <command> [args]

  login <email> [password]
  register <nickname> <email> [password]
  logout
  whoami
  events [list [--type work|life|growth] [--start S] [--end E]]
  events show <id>
  events create <title> <type> <start> <end> [location]
  events delete <id>
  notifications [list [--unread]] | unread | read <id> | read-all
  logs [--action create|update|delete] [--page N]
  admin users [page] | status <user-id> <active|disabled> | reset-password <user-id>
  ask <message>
  voice [audio-file]
  config";

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = config::load()?;
    init_logging(&config.logging)?;
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    match command.as_str() {
        "help" | "-h" | "--help" => {
            println!("{USAGE}");
            Ok(())
        }
        "config" => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        "voice" => {
            let builder = match rest.first() {
                Some(path) => {
                    let input = FileAudioInput::new(path).with_sample_rate(config.voice.sample_rate);
                    AppContext::builder(config).audio_input(Arc::new(input))
                }
                None => AppContext::builder(config),
            };
            let ctx = builder.build().await?;
            let result = run_voice(&ctx, rest.first().is_some()).await;
            finish(&ctx, result)
        }
        _ => {
            let ctx = AppContext::new_with_config(config).await?;
            let result = dispatch(&ctx, command, rest).await;
            finish(&ctx, result)
        }
    }
}

fn finish(ctx: &AppContext, result: Result<()>) -> Result<()> {
    if ctx.login_required() {
        eprintln!("登录已失效，请重新运行 `smartcal login`");
    }
    result
}

async fn dispatch(ctx: &AppContext, command: &str, args: &[String]) -> Result<()> {
    match command {
        "login" => {
            let email = arg(args, 0, "email")?;
            let password = match args.get(1) {
                Some(p) => p.clone(),
                None => prompt("密码: ")?,
            };
            let user = commands::login(ctx, email, &password).await?;
            println!("已登录: {} <{}>", user.nickname, user.email);
        }
        "register" => {
            let nickname = arg(args, 0, "nickname")?;
            let email = arg(args, 1, "email")?;
            let password = match args.get(2) {
                Some(p) => p.clone(),
                None => prompt("密码: ")?,
            };
            let request = RegisterRequest {
                nickname: nickname.to_string(),
                email: email.to_string(),
                password,
                avatar: None,
            };
            let user = commands::register(ctx, request).await?;
            println!("注册成功: {} <{}>", user.nickname, user.email);
        }
        "logout" => {
            commands::logout(ctx).await?;
            println!("已退出登录");
        }
        "whoami" => match commands::current_user(ctx).await? {
            Some(user) => print_user(&user),
            None => println!("未登录"),
        },
        "events" => run_events(ctx, args).await?,
        "notifications" => run_notifications(ctx, args).await?,
        "logs" => {
            let query = OperationLogQuery {
                action: flag(args, "--action")
                    .map(str::parse::<OperationAction>)
                    .transpose()
                    .map_err(|e| anyhow!(e))?,
                page: flag(args, "--page").map(str::parse).transpose()?,
                page_size: None,
            };
            let page = commands::list_operation_logs(ctx, query).await?;
            for log in &page.list {
                println!(
                    "{}  {:<6}  {}  {}",
                    log.created_at.format("%Y-%m-%d %H:%M"),
                    log.action,
                    log.target_title,
                    log.detail
                );
            }
            println!("共 {} 条", page.total);
        }
        "admin" => run_admin(ctx, args).await?,
        "ask" => {
            if args.is_empty() {
                bail!("usage: smartcal ask <message>");
            }
            run_ask(ctx, &args.join(" ")).await?;
        }
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    }
    Ok(())
}

async fn run_events(ctx: &AppContext, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str).unwrap_or("list") {
        "list" => {
            let query = EventListQuery {
                event_type: flag(args, "--type")
                    .map(str::parse::<EventType>)
                    .transpose()
                    .map_err(|e| anyhow!(e))?,
                start: flag(args, "--start").map(str::to_string),
                end: flag(args, "--end").map(str::to_string),
            };
            print_events(&commands::list_events(ctx, query).await?);
        }
        "show" => {
            let event = commands::get_event(ctx, id_arg(args, 1)?).await?;
            print_events(std::slice::from_ref(&event));
            if let Some(description) = &event.description {
                println!("    {description}");
            }
        }
        "create" => {
            let draft = EventDraft {
                title: arg(args, 1, "title")?.to_string(),
                event_type: arg(args, 2, "type")?.parse().map_err(|e: String| anyhow!(e))?,
                start_time: timestamp(arg(args, 3, "start")?)?,
                end_time: timestamp(arg(args, 4, "end")?)?,
                participant_ids: Vec::new(),
                location: args.get(5).cloned(),
                description: None,
            };
            let event = commands::create_event(ctx, draft).await?;
            println!("已创建日程 #{}", event.id);
        }
        "delete" => {
            let id = id_arg(args, 1)?;
            if commands::delete_event(ctx, id).await? {
                println!("已删除日程 #{id}");
            }
        }
        other => bail!("unknown events subcommand `{other}`"),
    }
    Ok(())
}

async fn run_notifications(ctx: &AppContext, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str).unwrap_or("list") {
        "list" => {
            let query = NotificationQuery {
                is_read: args.iter().any(|a| a == "--unread").then_some(false),
                ..NotificationQuery::default()
            };
            let page = commands::list_notifications(ctx, query).await?;
            for item in &page.list {
                let marker = if item.is_read { " " } else { "*" };
                println!("{marker} #{:<5} {:<10} {}", item.id, item.notification_type, item.content);
            }
        }
        "unread" => println!("{}", commands::unread_count(ctx).await?),
        "read" => {
            let item = commands::mark_read(ctx, id_arg(args, 1)?).await?;
            println!("#{} 已读", item.id);
        }
        "read-all" => println!("已标记 {} 条为已读", commands::mark_all_read(ctx).await?),
        other => bail!("unknown notifications subcommand `{other}`"),
    }
    Ok(())
}

async fn run_admin(ctx: &AppContext, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str).unwrap_or("users") {
        "users" => {
            let page = args.get(1).map(|p| p.parse()).transpose()?.unwrap_or(1);
            let users = commands::list_users(ctx, PageQuery::new(page, 20)).await?;
            for user in &users.list {
                print_user(user);
            }
            println!("共 {} 位用户", users.total);
        }
        "status" => {
            let status: UserStatus =
                arg(args, 2, "status")?.parse().map_err(|e: String| anyhow!(e))?;
            let user = commands::set_user_status(ctx, id_arg(args, 1)?, status).await?;
            print_user(&user);
        }
        "reset-password" => {
            let reset = commands::reset_password(ctx, id_arg(args, 1)?).await?;
            println!("用户 #{} 的临时密码: {}", reset.user_id, reset.new_password);
        }
        other => bail!("unknown admin subcommand `{other}`"),
    }
    Ok(())
}

async fn run_ask(ctx: &AppContext, message: &str) -> Result<()> {
    let mut reply = commands::ask(ctx, message).await?;
    loop {
        if reply.ignored {
            println!("(无内容可发送)");
            return Ok(());
        }
        print_turn(&reply.state);
        if let Some(events) = &reply.events {
            println!("\n日历已更新:");
            print_events(events);
        }
        match reply.next_step() {
            NextStep::Done => return Ok(()),
            NextStep::SelectCandidate => {
                let choice = prompt("选择目标日程编号 (回车取消): ")?;
                if choice.is_empty() {
                    println!("已取消");
                    return Ok(());
                }
                let index: usize = choice.parse().context("请输入编号")?;
                let candidate = index
                    .checked_sub(1)
                    .and_then(|i| reply.state.candidates.get(i))
                    .ok_or_else(|| anyhow!("没有编号为 {index} 的日程"))?;
                commands::select_candidate(ctx, candidate.id).await?;
            }
            NextStep::Confirm => {}
        }

        let answer = prompt("确认执行? [y/N] ")?;
        if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
            println!("已取消");
            return Ok(());
        }
        reply = commands::confirm(ctx).await?;
    }
}

async fn run_voice(ctx: &AppContext, from_file: bool) -> Result<()> {
    let outcome = if from_file {
        commands::transcribe_voice(ctx).await?
    } else {
        let state = commands::start_voice(ctx);
        if state.status != VoiceStatus::Recording {
            bail!(state.error.unwrap_or_default());
        }
        prompt("录音中，按回车结束…")?;
        commands::stop_voice(ctx).await?
    };

    match outcome {
        VoiceOutcome::Transcript(text) if text.is_empty() => println!("(未识别到内容)"),
        VoiceOutcome::Transcript(text) => {
            println!("识别结果: {text}");
            let answer = prompt("发送给助手? [y/N] ")?;
            if matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                run_ask(ctx, &text).await?;
            }
        }
        VoiceOutcome::Failed(message) => bail!(message),
        VoiceOutcome::Cancelled | VoiceOutcome::NotRecording => println!("录音已取消"),
    }
    Ok(())
}

fn print_turn(state: &TurnState) {
    match state.status {
        TurnStatus::Error => eprintln!("{}", state.result),
        _ => println!("{}", state.result),
    }
    if state.status != TurnStatus::NeedConfirm {
        return;
    }

    if let Some(proposal) = &state.proposal {
        println!("  操作: {}  标题: {}  类型: {}", proposal.action, proposal.title, proposal.event_type);
        if let (Some(start), Some(end)) = (proposal.start_time, proposal.end_time) {
            println!("  时间: {} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"));
        }
        if !proposal.location.is_empty() {
            println!("  地点: {}", proposal.location);
        }
        if !proposal.participant_keywords.is_empty() {
            println!("  参与人: {}", proposal.participant_keywords.join("、"));
        }
    }
    for (i, candidate) in state.candidates.iter().enumerate() {
        println!(
            "  [{}] {}  {}  {}",
            i + 1,
            candidate.title,
            candidate.start_time.format("%Y-%m-%d %H:%M"),
            candidate.location
        );
    }
}

fn print_events(events: &[EventItem]) {
    for event in events {
        println!(
            "#{:<5} {}-{}  [{}] {}{}",
            event.id,
            event.start_time.format("%m-%d %H:%M"),
            event.end_time.format("%H:%M"),
            event.event_type,
            event.title,
            event.location.as_deref().map(|l| format!(" @ {l}")).unwrap_or_default()
        );
    }
}

fn print_user(user: &User) {
    println!("#{:<5} {} <{}>  {}  {}", user.id, user.nickname, user.email, user.role, user.status);
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index).map(String::as_str).ok_or_else(|| anyhow!("missing <{name}>"))
}

fn id_arg(args: &[String], index: usize) -> Result<i64> {
    arg(args, index, "id")?.parse().context("id must be a number")
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).map(String::as_str)
}

fn timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("`{raw}` is not an RFC 3339 timestamp (e.g. 2026-05-06T10:00:00+08:00)"))
}
