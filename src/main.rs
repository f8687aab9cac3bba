use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use scorefeed::config::Config;
use scorefeed::engine::{extract_detail, filter_standings, is_live};
use scorefeed::feed::{
    fetch_scoreboards, standings_for, EspnFeed, FeedClient, StandingsCache,
};
use scorefeed::model::{Game, GameDetail, GameStatus, Side, Sport, TeamIdentifiers};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let feed = EspnFeed::new(
        config.base_url.as_deref(),
        Duration::from_secs(config.timeout_secs),
    )?;

    // Ctrl-C cancels in-flight feed calls instead of waiting out timeouts.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let date = config.date();
    match &config.event {
        Some(event_id) => {
            let sport = config.sports()[0];
            show_detail(&feed, sport, date, event_id, config.standings, &cancel).await
        }
        None => show_scoreboard(&feed, &config, date, &cancel).await,
    }
}

async fn show_scoreboard(
    feed: &EspnFeed,
    config: &Config,
    date: chrono::NaiveDate,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut games = fetch_scoreboards(feed, &config.sports(), date, cancel).await;
    if config.live_only {
        games.retain(is_live);
    }
    if games.is_empty() {
        println!("no games scheduled");
        return Ok(());
    }

    info!("{} games on {}", games.len(), date);
    let mut current_sport: Option<Sport> = None;
    for game in &games {
        if current_sport != Some(game.sport) {
            current_sport = Some(game.sport);
            println!("\n== {} ==", game.sport);
        }
        print_game_line(game);
    }
    Ok(())
}

fn print_game_line(game: &Game) {
    let away_possession = possession_marker(game, Side::Away);
    let home_possession = possession_marker(game, Side::Home);
    println!(
        "{:<26} {:>3} @ {:<26} {:>3}  [{}]{}",
        format!("{}{}", away_possession, game.away.name),
        game.away_score,
        format!("{}{}", home_possession, game.home.name),
        game.home_score,
        status_label(game),
        broadcast_suffix(game),
    );
    if let Some(state) = &game.baseball {
        let half = state
            .half
            .map(|h| format!("{:?}", h).to_lowercase())
            .unwrap_or_default();
        println!(
            "    {} {}  bases {}  {}-{} {} out",
            half,
            state.inning.unwrap_or_default(),
            state.bases,
            state.balls.unwrap_or_default(),
            state.strikes.unwrap_or_default(),
            state.outs.unwrap_or_default(),
        );
    }
    if let Some(odds) = &game.odds {
        let mut parts = Vec::new();
        if let Some(spread) = odds.spread {
            parts.push(format!(
                "spread away {:+} / home {:+}",
                spread,
                odds.home_spread().unwrap_or_default()
            ));
        }
        if let Some(total) = odds.over_under {
            parts.push(format!("o/u {}", total));
        }
        if let (Some(away), Some(home)) = (odds.away_moneyline, odds.home_moneyline) {
            parts.push(format!("ml {:+}/{:+}", away, home));
        }
        if !parts.is_empty() {
            println!("    {}", parts.join("  "));
        }
    }
}

fn possession_marker(game: &Game, side: Side) -> &'static str {
    let team = match side {
        Side::Away => &game.away,
        Side::Home => &game.home,
    };
    let has_ball = (game.possession_team.is_some() && game.possession_team == team.id)
        || game
            .baseball
            .as_ref()
            .map(|b| b.at_bat == Some(side))
            .unwrap_or(false);
    if has_ball {
        "> "
    } else {
        ""
    }
}

fn status_label(game: &Game) -> String {
    match game.status {
        GameStatus::Scheduled => game.display_time.clone(),
        GameStatus::Halftime => "Halftime".to_string(),
        GameStatus::Postponed => "Postponed".to_string(),
        GameStatus::Final => game.time.clone(),
        GameStatus::Live => {
            if game.time.is_empty() {
                "Live".to_string()
            } else {
                game.time.clone()
            }
        }
    }
}

fn broadcast_suffix(game: &Game) -> String {
    game.broadcast
        .as_deref()
        .map(|channel| format!(" ({})", channel))
        .unwrap_or_default()
}

async fn show_detail(
    feed: &EspnFeed,
    sport: Sport,
    date: chrono::NaiveDate,
    event_id: &str,
    with_standings: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let games = scorefeed::feed::scoreboard_games(feed, sport, date, cancel).await?;
    let Some(game) = games.iter().find(|g| g.id == event_id) else {
        anyhow::bail!("event {} not found on the {} scoreboard for {}", event_id, sport, date);
    };

    print_game_line(game);

    match feed.summary(sport, event_id, cancel).await {
        Ok(doc) => print_detail(game, &extract_detail(&doc, game)),
        Err(err) if err.is_cancelled() => return Ok(()),
        // One section failing must not blank the rest of the output.
        Err(err) => {
            warn!("summary fetch failed: {}", err);
            println!("unable to load game detail");
        }
    }

    if with_standings {
        let cache = StandingsCache::new();
        match standings_for(feed, &cache, sport, cancel).await {
            Ok(doc) => print_standings(&doc, game),
            Err(err) if err.is_cancelled() => return Ok(()),
            Err(err) => {
                warn!("standings fetch failed: {}", err);
                println!("could not load standings");
            }
        }
    }
    Ok(())
}

fn print_detail(game: &Game, detail: &GameDetail) {
    println!("\n           1    2    3    4   OT  TOT");
    print_linescore_row(&game.away.short_name, &detail.away_linescores, &game.away_score);
    print_linescore_row(&game.home.short_name, &detail.home_linescores, &game.home_score);

    if let Some(situation) = &detail.situation {
        let red_zone = if situation.red_zone { "  RED ZONE" } else { "" };
        println!(
            "\nsituation: {} at {}{}",
            situation.down_distance, situation.yard_line_text, red_zone
        );
    }

    if let Some(latest) = &detail.latest_win_probability {
        println!(
            "\nwin probability: {} {:.0}% / {} {:.0}%",
            game.home.short_name,
            latest.home * 100.0,
            game.away.short_name,
            latest.away * 100.0,
        );
        if let Some(play) = &latest.play {
            if !play.text.is_empty() {
                println!("  after: {}", play.text);
            }
        }
    }

    if !detail.leaders.is_empty() {
        println!("\nleaders:");
        for category in &detail.leaders {
            let leaders: Vec<String> = category
                .leaders
                .iter()
                .map(|l| format!("{} ({})", l.athlete, l.display_value))
                .collect();
            println!("  {:<18} {}", category.display_name, leaders.join(" / "));
        }
    }

    if !detail.headlines.is_empty() {
        println!();
        for headline in &detail.headlines {
            println!("  {}", headline);
        }
    }
}

fn print_linescore_row(name: &str, cells: &[String; 5], total: &str) {
    println!(
        "{:<8} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        name, cells[0], cells[1], cells[2], cells[3], cells[4], total
    );
}

fn print_standings(doc: &serde_json::Value, game: &Game) {
    let idents = TeamIdentifiers::from_game(game);
    let Some(filtered) = filter_standings(doc, &idents) else {
        println!("could not load standings");
        return;
    };

    if filtered.approximate {
        println!("\nstandings (closest available groups):");
    } else {
        println!("\nstandings:");
    }
    for group in &filtered.groups {
        println!("  {}", group.name);
        for entry in &group.entries {
            println!(
                "    {:<26} {:>3}-{:<3} {:.3}",
                entry.name, entry.wins, entry.losses, entry.win_percent
            );
        }
    }
}
