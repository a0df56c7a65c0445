//! Fishing game: catch fish, keep or sell them, trade coins.
//!
//! Counters are always changed with a single `UPDATE ... SET x = x + ?`
//! statement so concurrent clicks never lose an update.

use picord::{
    BotBuilder, Button, ButtonStyle, Color, Command, Context, Database, Embed, HandlerResult,
    ParamKind, Property, Ready, Reply, Result, Row, Sender, params,
};
use rand::Rng;
use std::fmt::Write;
use std::time::Duration;
use tracing::info;

/// How long button confirmations stay visible.
const CONFIRMATION_TTL: Duration = Duration::from_secs(3);

/// Leaderboard size.
const TOP_PLAYERS: i64 = 5;

/// A catchable fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fish {
    pub name: &'static str,
    pub value: i64,
    pub emoji: &'static str,
    /// Upper bound of this fish's slice of a 1..=100 roll
    upper_roll: u32,
}

pub static FISH: [Fish; 5] = [
    Fish { name: "Old Boot", value: 0, emoji: "👢", upper_roll: 30 },
    Fish { name: "Tiny Minnow", value: 5, emoji: "🐟", upper_roll: 70 },
    Fish { name: "Golden Carp", value: 50, emoji: "🐠", upper_roll: 90 },
    Fish { name: "Legendary Shark", value: 500, emoji: "🦈", upper_roll: 99 },
    Fish { name: "Kraken", value: 2000, emoji: "🐙", upper_roll: 100 },
];

/// The fish a roll in `1..=100` lands on.
pub fn fish_for_roll(roll: u32) -> &'static Fish {
    FISH.iter()
        .find(|fish| roll <= fish.upper_roll)
        .unwrap_or(&FISH[FISH.len() - 1])
}

/// Coin value of the fish called `name`; unknown fish are worthless.
pub fn fish_value(name: &str) -> i64 {
    FISH.iter()
        .find(|fish| fish.name == name)
        .map_or(0, |fish| fish.value)
}

/// Registers every fishing command and button.
pub fn register(builder: BotBuilder) -> BotBuilder {
    builder
        .on_ready(setup)
        .command(
            Command::slash("fish", "Cast your line and try to catch some fish!", fish)
                .with(Property::Cooldown(Duration::from_secs(2))),
        )
        .command(Command::slash("sell", "Sell all the fish in your inventory for coins.", sell))
        .command(
            Command::slash("transfer", "Transfer coins to another user.", transfer)
                .param("user", ParamKind::User, "Who receives the coins")
                .param("amount", ParamKind::Integer, "How many coins")
                .with(Property::Logged),
        )
        .command(Command::slash("profile", "View your inventory and coin balance.", profile))
        .command(Command::slash("leaderboard", "Check who the top fishers are!", leaderboard))
        .on_button("keep", keep)
        .on_button("sell_one", sell_one)
        .on_button("trash", trash)
        .on_button("sell_all", sell)
        .on_button("show_profile", profile)
}

/// Creates the game tables.
pub async fn create_tables(db: &Database) -> Result<()> {
    db.create_table(
        "users",
        &[
            ("user_id", "INTEGER PRIMARY KEY"),
            ("coins", "INTEGER DEFAULT 0"),
            ("fishes_caught", "INTEGER DEFAULT 0"),
        ],
    )
    .await?;
    db.create_table(
        "inventory",
        &[
            ("user_id", "INTEGER NOT NULL"),
            ("fish_name", "TEXT NOT NULL"),
            ("count", "INTEGER NOT NULL DEFAULT 0"),
        ],
    )
    .await?;
    db.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS inventory_owner ON inventory (user_id, fish_name)",
        params![],
    )
    .await?;
    Ok(())
}

async fn setup(ready: Ready) -> HandlerResult {
    if let Some(db) = &ready.db {
        create_tables(db).await?;
    }
    info!("Fishing bot ready as {}", ready.user.name);
    Ok(())
}

/// Balance snapshot of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Player {
    pub coins: i64,
    pub fishes_caught: i64,
}

/// Loads a player, creating the row on first use.
///
/// Insert-if-absent is not atomic; two first-time calls may race and one
/// insert is ignored.
async fn player(db: &Database, user_id: u64) -> Result<Player> {
    let row = db
        .get_one(
            "SELECT coins, fishes_caught FROM users WHERE user_id = ?",
            params![user_id],
        )
        .await?;
    match row {
        Some(row) => Ok(Player {
            coins: row.i64("coins")?,
            fishes_caught: row.i64("fishes_caught")?,
        }),
        None => {
            db.execute(
                "INSERT OR IGNORE INTO users (user_id, coins, fishes_caught) VALUES (?, 0, 0)",
                params![user_id],
            )
            .await?;
            Ok(Player::default())
        }
    }
}

async fn add_coins(db: &Database, user_id: u64, amount: i64) -> Result<()> {
    db.execute(
        "UPDATE users SET coins = coins + ? WHERE user_id = ?",
        params![amount, user_id],
    )
    .await?;
    Ok(())
}

async fn count_catch(db: &Database, user_id: u64) -> Result<()> {
    db.execute(
        "UPDATE users SET fishes_caught = fishes_caught + 1 WHERE user_id = ?",
        params![user_id],
    )
    .await?;
    Ok(())
}

async fn add_to_inventory(db: &Database, user_id: u64, fish_name: &str) -> Result<()> {
    player(db, user_id).await?;
    db.execute(
        "INSERT INTO inventory (user_id, fish_name, count) VALUES (?, ?, 1) \
         ON CONFLICT (user_id, fish_name) DO UPDATE SET count = count + 1",
        params![user_id, fish_name],
    )
    .await?;
    Ok(())
}

async fn inventory(db: &Database, user_id: u64) -> Result<Vec<Row>> {
    db.get(
        "SELECT fish_name, count FROM inventory WHERE user_id = ? ORDER BY fish_name",
        params![user_id],
    )
    .await
}

/// `/fish`
pub async fn fish(ctx: Context) -> HandlerResult {
    let db = ctx.database()?;
    player(db, ctx.sender().id).await?;

    let roll = rand::thread_rng().gen_range(1..=100);
    let caught = fish_for_roll(roll);

    let color = match caught {
        Fish { name: "Kraken", .. } => Color::ORANGE,
        Fish { value: 0, .. } => Color::RED,
        _ => Color::GREEN,
    };
    let embed = Embed::new()
        .title("🎣 You cast your line...")
        .color(color)
        .field("Caught", format!("{} **{}**", caught.emoji, caught.name), true)
        .field("Value", format!("💰 {} coins", caught.value), true)
        .footer("Choose an action below:");

    ctx.reply(
        Reply::from(embed)
            .button(Button::with_data("Keep", "keep", caught.name).style(ButtonStyle::Primary))
            .button(
                Button::with_data(format!("Sell (+{})", caught.value), "sell_one", caught.name)
                    .style(ButtonStyle::Success),
            )
            .button(Button::new("Throw Away", "trash").style(ButtonStyle::Danger)),
    )
    .await?;
    Ok(())
}

/// `keep:<fish>`
pub async fn keep(ctx: Context) -> HandlerResult {
    let Some(fish_name) = ctx.custom_id_data() else {
        return Ok(());
    };
    let db = ctx.database()?;
    add_to_inventory(db, ctx.sender().id, fish_name).await?;
    count_catch(db, ctx.sender().id).await?;

    ctx.reply(
        Reply::text(format!("✅ Kept **{fish_name}** in your inventory."))
            .hidden(true)
            .delete_after(CONFIRMATION_TTL),
    )
    .await?;
    // Remove the prompt so the catch cannot be claimed twice.
    ctx.delete_message().await;
    Ok(())
}

/// `sell_one:<fish>`
pub async fn sell_one(ctx: Context) -> HandlerResult {
    let Some(fish_name) = ctx.custom_id_data() else {
        return Ok(());
    };
    let db = ctx.database()?;
    let value = fish_value(fish_name);
    player(db, ctx.sender().id).await?;
    add_coins(db, ctx.sender().id, value).await?;
    count_catch(db, ctx.sender().id).await?;

    ctx.reply(
        Reply::text(format!("💰 Sold **{fish_name}** for **{value}** coins!"))
            .hidden(true)
            .delete_after(CONFIRMATION_TTL),
    )
    .await?;
    ctx.delete_message().await;
    Ok(())
}

/// `trash`
pub async fn trash(ctx: Context) -> HandlerResult {
    ctx.reply(
        Reply::text("🗑️ Threw it back into the sea.")
            .hidden(true)
            .delete_after(CONFIRMATION_TTL),
    )
    .await?;
    ctx.delete_message().await;
    Ok(())
}

/// `/sell` and the `sell_all` button.
///
/// The inventory is cleared and returned by one statement, so concurrent
/// clicks pay out each fish once.
pub async fn sell(ctx: Context) -> HandlerResult {
    let db = ctx.database()?;
    let rows = db
        .get(
            "DELETE FROM inventory WHERE user_id = ? RETURNING fish_name, count",
            params![ctx.sender().id],
        )
        .await?;
    if rows.is_empty() {
        ctx.reply(Reply::text("You have no fish to sell!").hidden(true))
            .await?;
        return Ok(());
    }

    let mut total_coins = 0;
    let mut items_sold = 0;
    for row in &rows {
        let count = row.i64("count")?;
        total_coins += fish_value(row.str("fish_name")?) * count;
        items_sold += count;
    }
    add_coins(db, ctx.sender().id, total_coins).await?;

    ctx.reply(format!("Sold **{items_sold}** fish for **{total_coins}** coins!"))
        .await?;
    Ok(())
}

/// Takes `amount` from `user_id` only if the balance covers it.
async fn debit(db: &Database, user_id: u64, amount: i64) -> Result<bool> {
    let touched = db
        .execute(
            "UPDATE users SET coins = coins - ? WHERE user_id = ? AND coins >= ?",
            params![amount, user_id, amount],
        )
        .await?;
    Ok(touched > 0)
}

/// `/transfer user amount`
pub async fn transfer(ctx: Context) -> HandlerResult {
    let db = ctx.database()?;
    let target: Sender = ctx.arg("user")?;
    let amount: i64 = ctx.arg("amount")?;

    let balance = player(db, ctx.sender().id).await?.coins;
    if balance < amount {
        ctx.reply(format!("Not enough coins! You only have {balance}."))
            .await?;
        return Ok(());
    }
    if amount <= 0 {
        ctx.reply("Invalid amount.").await?;
        return Ok(());
    }
    if target.id == ctx.sender().id {
        ctx.reply("You cannot transfer to yourself.").await?;
        return Ok(());
    }

    // The balance may have moved since it was read.
    if !debit(db, ctx.sender().id, amount).await? {
        let balance = player(db, ctx.sender().id).await?.coins;
        ctx.reply(format!("Not enough coins! You only have {balance}."))
            .await?;
        return Ok(());
    }
    player(db, target.id).await?;
    add_coins(db, target.id, amount).await?;

    ctx.reply(format!("💸 Transferred **{amount}** coins to **{}**!", target.name))
        .await?;
    Ok(())
}

/// `/profile` and the `show_profile` button.
pub async fn profile(ctx: Context) -> HandlerResult {
    let db = ctx.database()?;
    let stats = player(db, ctx.sender().id).await?;
    let rows = inventory(db, ctx.sender().id).await?;

    let mut listing = String::new();
    let mut worth = 0;
    for row in &rows {
        let name = row.str("fish_name")?;
        let count = row.i64("count")?;
        let value = fish_value(name) * count;
        worth += value;
        writeln!(listing, "• **{count}x** {name} (Val: {value})")?;
    }
    if listing.is_empty() {
        listing.push_str("Empty");
    }

    let sender = ctx.sender();
    let mut embed = Embed::new()
        .title(format!("👤 {}'s Profile", sender.name))
        .color(Color::BLUE)
        .field("💰 Balance", format!("{} coins", stats.coins), true)
        .field("🎣 Total Catches", format!("{} fish", stats.fishes_caught), true)
        .field("📦 Inventory", listing, false);
    if let Some(avatar) = &sender.avatar_url {
        embed = embed.thumbnail(avatar);
    }
    if worth > 0 {
        embed = embed.footer(format!("Inventory Worth: {worth} coins"));
    }

    let mut reply = Reply::from(embed);
    if !rows.is_empty() {
        reply = reply.button(Button::new("Sell All", "sell_all").style(ButtonStyle::Success));
    }
    ctx.reply(reply).await?;
    Ok(())
}

/// `/leaderboard`
pub async fn leaderboard(ctx: Context) -> HandlerResult {
    let db = ctx.database()?;
    let rows = db
        .get(
            "SELECT user_id, coins FROM users ORDER BY coins DESC LIMIT ?",
            params![TOP_PLAYERS],
        )
        .await?;
    if rows.is_empty() {
        ctx.send("No players yet!").await?;
        return Ok(());
    }

    let mut text = String::new();
    for (rank, row) in rows.iter().enumerate() {
        let user_id = row.i64("user_id")?;
        let name = match u64::try_from(user_id) {
            Ok(id) => ctx
                .fetch_user(id)
                .await
                .map_or_else(|_| format!("User {user_id}"), |user| user.name),
            Err(_) => format!("User {user_id}"),
        };
        writeln!(text, "**#{}** {name}: 💰 {}", rank + 1, row.i64("coins")?)?;
    }

    ctx.reply(
        Embed::new()
            .title("🏆 Fishing Leaderboard")
            .color(Color::YELLOW)
            .description(text),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use picord::events::{ComponentEvent, ReadyEvent, SlashEvent};
    use picord::{
        ArgValue, Bot, BotConfig, DispatchOutcome, Dispatcher, MemoryPlatform, RawEvent,
    };
    use std::sync::Arc;

    struct Game {
        dispatcher: Dispatcher,
        platform: Arc<MemoryPlatform>,
        db: Database,
    }

    async fn start_game() -> Result<Game> {
        let db = Database::in_memory().await?;
        let bot = register(Bot::builder(BotConfig::with_prefix("~")))
            .database(db.clone())
            .build()?;
        let platform = Arc::new(MemoryPlatform::new());
        let dispatcher = bot.dispatcher(platform.clone());
        let ready = dispatcher
            .dispatch(RawEvent::Ready(ReadyEvent {
                user: Sender::new(999, "fishbot"),
                session_id: "test".to_string(),
            }))
            .await;
        assert_eq!(ready, DispatchOutcome::Ready);
        Ok(Game {
            dispatcher,
            platform,
            db,
        })
    }

    async fn seed(db: &Database, user_id: u64, coins: i64, fishes_caught: i64) -> Result<()> {
        db.execute(
            "INSERT INTO users (user_id, coins, fishes_caught) VALUES (?, ?, ?)",
            params![user_id, coins, fishes_caught],
        )
        .await?;
        Ok(())
    }

    async fn stats(db: &Database, user_id: u64) -> Result<Player> {
        let row = db
            .get_one(
                "SELECT coins, fishes_caught FROM users WHERE user_id = ?",
                params![user_id],
            )
            .await?
            .unwrap();
        Ok(Player {
            coins: row.i64("coins")?,
            fishes_caught: row.i64("fishes_caught")?,
        })
    }

    async fn snapshot(db: &Database) -> Result<(Vec<Row>, Vec<Row>)> {
        Ok((
            db.get("SELECT * FROM users ORDER BY user_id", params![])
                .await?,
            db.get("SELECT * FROM inventory ORDER BY user_id, fish_name", params![])
                .await?,
        ))
    }

    fn click(user: &Sender, custom_id: &str) -> RawEvent {
        RawEvent::Component(ComponentEvent::new(user.clone(), custom_id))
    }

    fn slash(user: &Sender, name: &str) -> SlashEvent {
        SlashEvent::new(user.clone(), name)
    }

    #[test]
    fn test_rolls_follow_weighted_table() {
        assert_eq!(fish_for_roll(1).name, "Old Boot");
        assert_eq!(fish_for_roll(30).name, "Old Boot");
        assert_eq!(fish_for_roll(31).name, "Tiny Minnow");
        assert_eq!(fish_for_roll(90).name, "Golden Carp");
        assert_eq!(fish_for_roll(99).name, "Legendary Shark");
        assert_eq!(fish_for_roll(100).name, "Kraken");
    }

    #[test]
    fn test_fish_value_lookup() {
        assert_eq!(fish_value("Golden Carp"), 50);
        assert_eq!(fish_value("Rubber Duck"), 0);
    }

    #[tokio::test]
    async fn test_sell_one_adds_value_and_counts_one_catch() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        seed(&game.db, 1, 7, 2).await?;

        let outcome = game
            .dispatcher
            .dispatch(click(&ana, "sell_one:Golden Carp"))
            .await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(
            stats(&game.db, 1).await?,
            Player {
                coins: 57,
                fishes_caught: 3
            }
        );
        let sent = game.platform.outbound().await;
        assert!(sent[0].reply.hidden);
        assert_eq!(
            sent[0].reply.content.as_deref(),
            Some("💰 Sold **Golden Carp** for **50** coins!")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_coins() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        game.platform.add_user(ana.clone()).await;
        game.platform.add_user(Sender::new(2, "bo")).await;
        seed(&game.db, 1, 0, 0).await?;
        seed(&game.db, 2, 10, 0).await?;

        game.dispatcher
            .dispatch(click(&ana, "sell_one:Golden Carp"))
            .await;
        game.dispatcher
            .dispatch(RawEvent::Slash(slash(&ana, "leaderboard")))
            .await;

        let sent = game.platform.outbound().await;
        let board = sent.last().unwrap().reply.embeds[0]
            .description
            .clone()
            .unwrap();
        assert_eq!(board, "**#1** ana: 💰 50\n**#2** bo: 💰 10\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_leaderboard_falls_back_to_user_id() -> Result<()> {
        let game = start_game().await?;
        seed(&game.db, 5, 3, 0).await?;

        game.dispatcher
            .dispatch(RawEvent::Slash(slash(&Sender::new(1, "ana"), "leaderboard")))
            .await;

        let sent = game.platform.outbound().await;
        let board = sent[0].reply.embeds[0].description.clone().unwrap();
        assert!(board.contains("User 5: 💰 3"));
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds_writes_nothing() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        let bo = Sender::new(2, "bo");
        seed(&game.db, 1, 30, 4).await?;
        seed(&game.db, 2, 0, 0).await?;
        let before = snapshot(&game.db).await?;

        let outcome = game
            .dispatcher
            .dispatch(RawEvent::Slash(
                slash(&ana, "transfer")
                    .arg("user", ArgValue::User(bo))
                    .arg("amount", ArgValue::Integer(50)),
            ))
            .await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(
            game.platform.contents().await,
            vec!["Not enough coins! You only have 30."]
        );
        assert_eq!(snapshot(&game.db).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_moves_coins_to_new_player() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        seed(&game.db, 1, 30, 0).await?;

        game.dispatcher
            .dispatch(RawEvent::Slash(
                slash(&ana, "transfer")
                    .arg("user", ArgValue::User(Sender::new(2, "bo")))
                    .arg("amount", ArgValue::Integer(20)),
            ))
            .await;

        assert_eq!(stats(&game.db, 1).await?.coins, 10);
        assert_eq!(stats(&game.db, 2).await?.coins, 20);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_to_self_rejected() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        seed(&game.db, 1, 30, 0).await?;

        game.dispatcher
            .dispatch(RawEvent::Slash(
                slash(&ana, "transfer")
                    .arg("user", ArgValue::User(ana.clone()))
                    .arg("amount", ArgValue::Integer(5)),
            ))
            .await;

        assert_eq!(
            game.platform.contents().await,
            vec!["You cannot transfer to yourself."]
        );
        assert_eq!(stats(&game.db, 1).await?.coins, 30);
        Ok(())
    }

    #[tokio::test]
    async fn test_keep_then_sell_all() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");

        for custom_id in ["keep:Tiny Minnow", "keep:Tiny Minnow", "keep:Golden Carp"] {
            game.dispatcher.dispatch(click(&ana, custom_id)).await;
        }
        assert_eq!(inventory(&game.db, 1).await?.len(), 2);
        assert_eq!(stats(&game.db, 1).await?.fishes_caught, 3);

        let outcome = game.dispatcher.dispatch(click(&ana, "sell_all")).await;
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(stats(&game.db, 1).await?.coins, 60);
        assert!(inventory(&game.db, 1).await?.is_empty());
        assert_eq!(
            game.platform.contents().await.last().unwrap(),
            "Sold **3** fish for **60** coins!"
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_never_overdraw() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        seed(&game.db, 1, 30, 0).await?;
        seed(&game.db, 2, 0, 0).await?;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                game.dispatcher.spawn(RawEvent::Slash(
                    slash(&ana, "transfer")
                        .arg("user", ArgValue::User(Sender::new(2, "bo")))
                        .arg("amount", ArgValue::Integer(30)),
                ))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), DispatchOutcome::Completed);
        }

        assert_eq!(stats(&game.db, 1).await?.coins, 0);
        assert_eq!(stats(&game.db, 2).await?.coins, 30);
        let transferred = game
            .platform
            .contents()
            .await
            .iter()
            .filter(|text| text.starts_with("💸"))
            .count();
        assert_eq!(transferred, 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sell_all_pays_once() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana");
        game.dispatcher.dispatch(click(&ana, "keep:Golden Carp")).await;

        let handles: Vec<_> = (0..10)
            .map(|_| game.dispatcher.spawn(click(&ana, "sell_all")))
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), DispatchOutcome::Completed);
        }

        assert_eq!(stats(&game.db, 1).await?.coins, 50);
        assert!(inventory(&game.db, 1).await?.is_empty());
        let sold = game
            .platform
            .contents()
            .await
            .iter()
            .filter(|text| text.starts_with("Sold"))
            .count();
        assert_eq!(sold, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sell_with_empty_inventory() -> Result<()> {
        let game = start_game().await?;
        game.dispatcher
            .dispatch(RawEvent::Slash(slash(&Sender::new(1, "ana"), "sell")))
            .await;

        let sent = game.platform.outbound().await;
        assert_eq!(sent[0].reply.content.as_deref(), Some("You have no fish to sell!"));
        assert!(sent[0].reply.hidden);
        Ok(())
    }

    #[tokio::test]
    async fn test_fish_offers_three_actions() -> Result<()> {
        let game = start_game().await?;
        let outcome = game
            .dispatcher
            .dispatch(RawEvent::Slash(slash(&Sender::new(1, "ana"), "fish")))
            .await;
        assert_eq!(outcome, DispatchOutcome::Completed);

        let sent = game.platform.outbound().await;
        let ids: Vec<&str> = sent[0]
            .reply
            .buttons
            .iter()
            .map(|b| b.custom_id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0].starts_with("keep:"));
        assert!(ids[1].starts_with("sell_one:"));
        assert_eq!(ids[2], "trash");
        // The prompt created the player row.
        assert_eq!(stats(&game.db, 1).await?, Player::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_lists_inventory_and_offers_sell_all() -> Result<()> {
        let game = start_game().await?;
        let ana = Sender::new(1, "ana").with_avatar("https://cdn.example/ana.png");
        game.dispatcher.dispatch(click(&ana, "keep:Golden Carp")).await;

        game.dispatcher
            .dispatch(RawEvent::Slash(slash(&ana, "profile")))
            .await;

        let sent = game.platform.outbound().await;
        let reply = &sent.last().unwrap().reply;
        let embed = &reply.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("👤 ana's Profile"));
        assert_eq!(embed.thumbnail.as_deref(), Some("https://cdn.example/ana.png"));
        assert_eq!(embed.fields[2].value, "• **1x** Golden Carp (Val: 50)\n");
        assert_eq!(embed.footer.as_deref(), Some("Inventory Worth: 50 coins"));
        assert_eq!(reply.buttons[0].custom_id, "sell_all");
        Ok(())
    }

    #[tokio::test]
    async fn test_setup_is_idempotent() -> Result<()> {
        let game = start_game().await?;
        seed(&game.db, 1, 10, 0).await?;
        create_tables(&game.db).await?;
        assert_eq!(stats(&game.db, 1).await?.coins, 10);
        Ok(())
    }
}
