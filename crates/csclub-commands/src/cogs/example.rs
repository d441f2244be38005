//! Example commands showing how commands, arguments and subcommands are
//! written.

use crate::error_handler::CommandError;
use crate::extensions::Extension;
use crate::framework::{Context, Data, Error};
use crate::metadata::HelpCategory;
use csclub_common::utils::reverse_graphemes;
use csclub_common::UserId;
use rand::seq::SliceRandom;
use rand::Rng;

/// The example extension.
pub const EXTENSION: Extension = Extension {
    name: "cogs.example",
    category: HelpCategory("Example"),
    authors: &[],
    commands,
};

/// Smallest value `random int` accepts.
pub const MIN_VALUE: i64 = -9_007_199_254_740_991;
/// Largest value `random int` accepts.
pub const MAX_VALUE: i64 = 9_007_199_254_740_992;

const FUN_FACTS: [&str; 6] = [
    "14 people a year name their baby daughter Abcde (pronounced ab-sidy).",
    "Gay people are cool! :sunglasses:",
    "The Lego Ninjago TV Series has 14 seasons (as of June 12, 2021) and is still ongoing. <:panic:839223803573043240>",
    r"14 \* 4 + 13 is a nice number.",
    "The iCarly 2021 remake is totally just for the money.",
    "Le-a is pronounced \"ledasha\".",
];

fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        greet(),
        farewell(),
        funfact(),
        copyme(),
        copymynum(),
        copyme2(),
        flipmsg(),
        addone(),
        random(),
    ]
}

/// Says hi to you!
#[poise::command(prefix_command)]
pub async fn greet(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("Hello {}!", ctx.author().name)).await?;
    Ok(())
}

/// Says bye to you!
#[poise::command(prefix_command)]
pub async fn farewell(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("Bye {}!", ctx.author().name)).await?;
    Ok(())
}

/// A random entry of the fun fact list.
pub fn random_fact() -> &'static str {
    FUN_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FUN_FACTS[0])
}

/// Give you a fun fact!
#[poise::command(prefix_command, aliases("gimmeafact"))]
pub async fn funfact(ctx: Context<'_>) -> Result<(), Error> {
    let fact = random_fact();
    ctx.say(fact).await?;
    Ok(())
}

/// Tells you what argument you sent!
#[poise::command(prefix_command)]
pub async fn copyme(ctx: Context<'_>, #[description = "A single word"] arg: String) -> Result<(), Error> {
    ctx.say(format!("{} said `{arg}`! :open_mouth:", ctx.author().name))
        .await?;
    Ok(())
}

/// Tells you what *number* you sent!
#[poise::command(prefix_command)]
pub async fn copymynum(ctx: Context<'_>, #[description = "A whole number"] arg: i64) -> Result<(), Error> {
    ctx.say(format!("{} said `{arg}`! Good number.", ctx.author().name))
        .await?;
    Ok(())
}

/// Example command.
///
/// Tells you what your first and second arguments were, and gets lazy and
/// just gives you a list of the rest of your arguments.
#[poise::command(prefix_command)]
pub async fn copyme2(
    ctx: Context<'_>,
    arg1: String,
    arg2: String,
    rest: Vec<String>,
) -> Result<(), Error> {
    let message = format!(
        "Author: {}\nArg 1: {arg1}\nArg 2: {arg2}\nRest: {rest:?}\n",
        ctx.author().name
    );
    ctx.say(message).await?;
    Ok(())
}

/// Reverses your message
#[poise::command(prefix_command)]
pub async fn flipmsg(ctx: Context<'_>, #[rest] msg: String) -> Result<(), Error> {
    let author = UserId(ctx.author().id.get());
    ctx.say(format!("{}\n{}", author.mention(), reverse_graphemes(&msg)))
        .await?;
    Ok(())
}

/// Add one to an argument (because you clearly can't do math)
#[poise::command(prefix_command)]
pub async fn addone(ctx: Context<'_>, num: Option<i64>) -> Result<(), Error> {
    let num = num.unwrap_or(0);
    let next = num
        .checked_add(1)
        .ok_or_else(|| CommandError::BadArgument("That number is too big.".to_string()))?;
    ctx.say(format!("{num} + 1 = {next}")).await?;
    Ok(())
}

/// Get a random decimal number between the two values given
#[poise::command(prefix_command, aliases("rand"), subcommands("random_int"))]
pub async fn random(ctx: Context<'_>, start: f64, stop: f64) -> Result<(), Error> {
    let value = uniform(start, stop)?;
    ctx.say(value.to_string()).await?;
    Ok(())
}

/// Get a random integer between the two values given (inclusive)
#[poise::command(prefix_command, rename = "int")]
pub async fn random_int(ctx: Context<'_>, start: i64, stop: i64) -> Result<(), Error> {
    let value = random_between(start, stop)?;
    ctx.say(value.to_string()).await?;
    Ok(())
}

/// A uniformly distributed float between `start` and `stop`, in either order.
pub fn uniform(start: f64, stop: f64) -> Result<f64, CommandError> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(CommandError::BadArgument(
            "Both values should be finite numbers.".to_string(),
        ));
    }
    let fraction: f64 = rand::thread_rng().gen();
    Ok((stop - start).mul_add(fraction, start))
}

/// A uniformly distributed integer between `start` and `stop` inclusive, in
/// either order.
pub fn random_between(start: i64, stop: i64) -> Result<i64, CommandError> {
    let (left, right) = (start.min(stop), start.max(stop));
    if left < MIN_VALUE {
        return Err(CommandError::BadArgument(format!(
            "Lower value is too small. It should be greater than {MIN_VALUE}."
        )));
    }
    if right > MAX_VALUE {
        return Err(CommandError::BadArgument(format!(
            "Greater value is too big. It should be less than {MAX_VALUE}."
        )));
    }
    Ok(rand::thread_rng().gen_range(left..=right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_between_stays_in_bounds() {
        for _ in 0..100 {
            let value = random_between(10, 1).unwrap();
            assert!((1..=10).contains(&value));
        }
        assert_eq!(random_between(7, 7).unwrap(), 7);
    }

    #[test]
    fn test_random_between_rejects_out_of_range() {
        assert_eq!(
            random_between(MIN_VALUE - 1, 0),
            Err(CommandError::BadArgument(format!(
                "Lower value is too small. It should be greater than {MIN_VALUE}."
            )))
        );
        assert!(random_between(0, MAX_VALUE + 1).is_err());
        assert!(random_between(MIN_VALUE, MAX_VALUE).is_ok());
    }

    #[test]
    fn test_uniform() {
        for _ in 0..100 {
            let value = uniform(5.0, -5.0).unwrap();
            assert!((-5.0..=5.0).contains(&value));
        }
        assert!(uniform(f64::NAN, 1.0).is_err());
        assert!(uniform(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_random_fact_is_listed() {
        assert!(FUN_FACTS.contains(&random_fact()));
    }
}
