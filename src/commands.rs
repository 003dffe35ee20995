//! The command table and one handler per command.
//!
//! Handlers validate their arguments before touching the network, answer
//! "not found" results themselves, and return every other failure as an
//! error for the dispatch boundary to turn into a generic reply.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use teloxide::types::BotCommand;
use teloxide::utils::html;

use crate::apis::DataSource;
use crate::format;
use crate::platform::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Ajuda,
    Dolar,
    Moeda,
    Clima,
    Piada,
    Frase,
    Sorteio,
    Gif,
    Noticias,
}

struct CommandInfo {
    name: &'static str,
    command: Command,
    args: &'static str,
    description: &'static str,
}

/// Every command the bot answers to, in help order.
const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "start",
        command: Command::Start,
        args: "",
        description: "Apresentação",
    },
    CommandInfo {
        name: "ajuda",
        command: Command::Ajuda,
        args: "",
        description: "Lista de comandos",
    },
    CommandInfo {
        name: "dolar",
        command: Command::Dolar,
        args: "",
        description: "Cotação do dólar",
    },
    CommandInfo {
        name: "clima",
        command: Command::Clima,
        args: "<cidade>",
        description: "Clima atual",
    },
    CommandInfo {
        name: "moeda",
        command: Command::Moeda,
        args: "<qtd> <origem> <destino>",
        description: "Conversão de moedas",
    },
    CommandInfo {
        name: "piada",
        command: Command::Piada,
        args: "",
        description: "Piada aleatória",
    },
    CommandInfo {
        name: "frase",
        command: Command::Frase,
        args: "",
        description: "Frase motivacional",
    },
    CommandInfo {
        name: "gif",
        command: Command::Gif,
        args: "<tema>",
        description: "GIF por tema",
    },
    CommandInfo {
        name: "noticias",
        command: Command::Noticias,
        args: "<tema>",
        description: "Últimas notícias",
    },
    CommandInfo {
        name: "sorteio",
        command: Command::Sorteio,
        args: "…",
        description: "Sorteia número ou nome",
    },
];

/// Extra names that resolve to an existing command but stay out of the menu.
const ALIASES: &[(&str, Command)] = &[("help", Command::Ajuda)];

const GREETING: &str = "Olá, eu sou a Eco, seu bot de informações! Use /ajuda para saber mais.";

const MOEDA_USAGE: &str = "Use: /moeda <quantia> <origem> <destino>\nEx: /moeda 100 USD BRL";
const INVALID_AMOUNT: &str = "Quantia inválida.";
const INVALID_PAIR: &str = "Par de moedas inválido.";
const DOLAR_UNAVAILABLE: &str = "Cotação do dólar indisponível no momento.";
const CLIMA_USAGE: &str = "Ex.: /clima Rio de Janeiro";
const CITY_NOT_FOUND: &str = "❌ Cidade não encontrada.";
const JOKE_UNAVAILABLE: &str = "Não consegui encontrar uma piada agora.";
const SORTEIO_USAGE: &str = "Use: /sorteio <n1> <n2>  ou  /sorteio nome1 nome2 …";
const GIF_USAGE: &str = "Use: /gif <tema>";
const GIF_NOT_FOUND: &str = "Nenhum GIF encontrado.";
const NOTICIAS_USAGE: &str = "Use: /noticias <tema>";
const NEWS_NOT_FOUND: &str = "Não encontrei notícias.";

const PHRASES: &[&str] = &[
    "Acredite em si mesmo!",
    "Sucesso é a soma de pequenos esforços diários.",
    "Não pare até se orgulhar.",
    "Faça o que ama.",
    "Cada dia é uma oportunidade.",
];

impl Command {
    /// Resolve a command name as typed after the slash. Telegram clients may
    /// send any casing; the table holds lowercase names.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        COMMANDS
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.command)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == name)
                    .map(|(_, command)| *command)
            })
    }

    pub fn name(self) -> &'static str {
        COMMANDS
            .iter()
            .find(|info| info.command == self)
            .map(|info| info.name)
            .unwrap_or("?")
    }
}

/// One parsed inbound command: the resolved command and its whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandCall {
    pub command: Command,
    pub args: Vec<String>,
}

impl CommandCall {
    /// Parse `/name arg1 arg2…` or `/name@BotName …`. Returns `None` for plain
    /// text, unknown commands and commands addressed to another bot.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, target)) if target.eq_ignore_ascii_case(bot_username) => name,
            Some(_) => return None,
            None => head,
        };

        Some(Self {
            command: Command::from_name(name)?,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// The command menu registered with Telegram.
pub fn bot_commands() -> Vec<BotCommand> {
    COMMANDS
        .iter()
        .map(|info| BotCommand::new(info.name, info.description))
        .collect()
}

pub fn help_text() -> String {
    let mut text = format!("🌿 {}\n\n", html::bold("Comandos disponíveis:"));
    for info in COMMANDS {
        let usage = if info.args.is_empty() {
            format!("/{}", info.name)
        } else {
            format!("/{} {}", info.name, info.args)
        };
        text.push_str(&format!(
            "{} – {}\n",
            html::escape(&usage),
            html::escape(info.description)
        ));
    }
    text
}

/// Run one command.
pub async fn handle(call: &CommandCall, source: &dyn DataSource) -> Result<Reply> {
    let args = call.args.as_slice();
    match call.command {
        Command::Start => Ok(Reply::text(GREETING)),
        Command::Ajuda => Ok(Reply::Html(help_text())),
        Command::Dolar => dolar(source).await,
        Command::Moeda => moeda(args, source).await,
        Command::Clima => clima(args, source).await,
        Command::Piada => piada(source).await,
        Command::Frase => Ok(frase()),
        Command::Sorteio => Ok(sorteio(args)),
        Command::Gif => gif(args, source).await,
        Command::Noticias => noticias(args, source).await,
    }
}

async fn dolar(source: &dyn DataSource) -> Result<Reply> {
    match source.spot_rate("USD", "BRL").await {
        Ok(bid) => Ok(Reply::Text(format::dollar_quote(bid))),
        Err(e) if e.is_not_found() => Ok(Reply::text(DOLAR_UNAVAILABLE)),
        Err(e) => Err(e).context("dollar quote failed"),
    }
}

async fn moeda(args: &[String], source: &dyn DataSource) -> Result<Reply> {
    let [amount, from, to] = args else {
        return Ok(Reply::text(MOEDA_USAGE));
    };
    let Some(amount) = parse_amount(amount) else {
        return Ok(Reply::text(INVALID_AMOUNT));
    };
    let (from, to) = (from.to_uppercase(), to.to_uppercase());

    match source.convert(amount, &from, &to).await {
        Ok(total) => Ok(Reply::Text(format::conversion(amount, &from, total, &to))),
        Err(e) if e.is_not_found() => Ok(Reply::text(INVALID_PAIR)),
        Err(e) => Err(e).with_context(|| format!("conversion {}-{} failed", from, to)),
    }
}

/// Accepts both `10.5` and `10,5`.
fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

async fn clima(args: &[String], source: &dyn DataSource) -> Result<Reply> {
    if args.is_empty() {
        return Ok(Reply::text(CLIMA_USAGE));
    }
    let city = args.join(" ");

    match source.weather(&city).await {
        Ok(weather) => Ok(Reply::Text(format::weather_report(&city, &weather))),
        Err(e) if e.is_not_found() => Ok(Reply::text(CITY_NOT_FOUND)),
        Err(e) => Err(e).with_context(|| format!("weather for '{}' failed", city)),
    }
}

async fn piada(source: &dyn DataSource) -> Result<Reply> {
    match source.joke().await {
        Ok(joke) => Ok(Reply::Text(format::joke(&joke))),
        Err(e) if e.is_not_found() => Ok(Reply::text(JOKE_UNAVAILABLE)),
        Err(e) => Err(e).context("joke fetch failed"),
    }
}

fn frase() -> Reply {
    Reply::text(pick_phrase(&mut rand::thread_rng()))
}

fn pick_phrase<R: Rng>(rng: &mut R) -> &'static str {
    PHRASES.choose(rng).copied().unwrap_or(PHRASES[0])
}

fn sorteio(args: &[String]) -> Reply {
    Reply::Text(draw(args, &mut rand::thread_rng()))
}

/// Two non-negative integers draw from the closed range between them, in
/// either order. Anything else draws one of the arguments.
fn draw<R: Rng>(args: &[String], rng: &mut R) -> String {
    if let [a, b] = args {
        if let (Some(a), Some(b)) = (parse_bound(a), parse_bound(b)) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            return format!("Número sorteado: {}", rng.gen_range(low..=high));
        }
    }

    match args.choose(rng) {
        Some(choice) => format!("Sorteado: {}", choice),
        None => SORTEIO_USAGE.to_string(),
    }
}

fn parse_bound(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

async fn gif(args: &[String], source: &dyn DataSource) -> Result<Reply> {
    if args.is_empty() {
        return Ok(Reply::text(GIF_USAGE));
    }
    // Form encoding sends the spaces as '+': "gatos fofos" → q=gatos+fofos.
    let term = args.join(" ");

    match source.gif(&term).await {
        Ok(url) => Ok(Reply::Animation(url)),
        Err(e) if e.is_not_found() => Ok(Reply::text(GIF_NOT_FOUND)),
        Err(e) => Err(e).with_context(|| format!("gif search '{}' failed", term)),
    }
}

async fn noticias(args: &[String], source: &dyn DataSource) -> Result<Reply> {
    if args.is_empty() {
        return Ok(Reply::text(NOTICIAS_USAGE));
    }
    let term = args.join(" ");

    match source.news(&term).await {
        Ok(articles) => Ok(Reply::Text(format::news_digest(&articles))),
        Err(e) if e.is_not_found() => Ok(Reply::text(NEWS_NOT_FOUND)),
        Err(e) => Err(e).with_context(|| format!("news search '{}' failed", term)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::apis::{ApiError, Article, Joke, Weather};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reqwest::Url;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned answers; counts every call so tests can prove no request was made.
    pub(crate) struct FakeSource {
        pub calls: AtomicUsize,
        pub rate: Option<f64>,
        pub weather: Option<Weather>,
        pub joke: Option<Joke>,
        pub gif: Option<Url>,
        pub news: Vec<Article>,
    }

    impl FakeSource {
        pub(crate) fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rate: Some(5.0),
                weather: Some(Weather {
                    temp_c: 22.46,
                    condition: "Chuva fraca".to_string(),
                }),
                joke: Some(Joke {
                    setup: "Setup".to_string(),
                    punchline: "Punch".to_string(),
                }),
                gif: Some(Url::parse("https://media.giphy.com/a.gif").unwrap()),
                news: vec![Article {
                    title: "Manchete".to_string(),
                    url: "https://n/1".to_string(),
                }],
            }
        }

        pub(crate) fn empty() -> Self {
            Self {
                rate: None,
                weather: None,
                joke: None,
                gif: None,
                news: Vec::new(),
                ..Self::new()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn not_found() -> ApiError {
        ApiError::NotFound("fake".to_string())
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn spot_rate(&self, _base: &str, _quote: &str) -> Result<f64, ApiError> {
            self.hit();
            self.rate.ok_or_else(not_found)
        }

        async fn weather(&self, _city: &str) -> Result<Weather, ApiError> {
            self.hit();
            self.weather.clone().ok_or_else(not_found)
        }

        async fn joke(&self) -> Result<Joke, ApiError> {
            self.hit();
            self.joke.clone().ok_or_else(not_found)
        }

        async fn gif(&self, _term: &str) -> Result<Url, ApiError> {
            self.hit();
            self.gif.clone().ok_or_else(not_found)
        }

        async fn news(&self, _term: &str) -> Result<Vec<Article>, ApiError> {
            self.hit();
            if self.news.is_empty() {
                Err(not_found())
            } else {
                Ok(self.news.clone())
            }
        }
    }

    /// Every data call fails like a timed-out request would.
    struct BrokenSource;

    #[async_trait]
    impl DataSource for BrokenSource {
        async fn spot_rate(&self, _base: &str, _quote: &str) -> Result<f64, ApiError> {
            Err(ApiError::Malformed("timeout".to_string()))
        }
        async fn weather(&self, _city: &str) -> Result<Weather, ApiError> {
            Err(ApiError::MissingKey("weather"))
        }
        async fn joke(&self) -> Result<Joke, ApiError> {
            Err(ApiError::Malformed("timeout".to_string()))
        }
        async fn gif(&self, _term: &str) -> Result<Url, ApiError> {
            Err(ApiError::MissingKey("gif"))
        }
        async fn news(&self, _term: &str) -> Result<Vec<Article>, ApiError> {
            Err(ApiError::MissingKey("news"))
        }
    }

    pub(crate) fn call(command: Command, args: &[&str]) -> CommandCall {
        CommandCall {
            command,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    async fn reply(source: &FakeSource, command: Command, args: &[&str]) -> Reply {
        handle(&call(command, args), source).await.unwrap()
    }

    #[test]
    fn test_parse_command_and_args() {
        let parsed = CommandCall::parse("/moeda 100 usd brl", "EcoBot").unwrap();
        assert_eq!(parsed, call(Command::Moeda, &["100", "usd", "brl"]));

        let parsed = CommandCall::parse("  /clima   Rio  de Janeiro ", "EcoBot").unwrap();
        assert_eq!(parsed.args, vec!["Rio", "de", "Janeiro"]);
    }

    #[test]
    fn test_parse_mentions() {
        assert_eq!(
            CommandCall::parse("/dolar@ecobot", "EcoBot").unwrap().command,
            Command::Dolar
        );
        assert!(CommandCall::parse("/dolar@OtherBot", "EcoBot").is_none());
    }

    #[tokio::test]
    async fn test_any_casing_and_extra_words_accepted() {
        let parsed = CommandCall::parse("/Start agora por favor", "EcoBot").unwrap();
        assert_eq!(parsed.command, Command::Start);
        assert_eq!(
            reply(&FakeSource::new(), parsed.command, &["agora"]).await,
            Reply::text(GREETING)
        );

        let parsed = CommandCall::parse("/HELP", "EcoBot").unwrap();
        assert_eq!(parsed.command, Command::Ajuda);
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert!(CommandCall::parse("dolar", "EcoBot").is_none());
        assert!(CommandCall::parse("/desconhecido", "EcoBot").is_none());
        assert!(CommandCall::parse("", "EcoBot").is_none());
        assert!(CommandCall::parse("/", "EcoBot").is_none());
    }

    #[test]
    fn test_command_table() {
        for info in COMMANDS {
            assert_eq!(Command::from_name(info.name), Some(info.command));
            assert_eq!(info.command.name(), info.name);
        }
        assert_eq!(Command::from_name("help"), Some(Command::Ajuda));
        assert_eq!(Command::from_name("DOLAR"), Some(Command::Dolar));
        assert_eq!(bot_commands().len(), COMMANDS.len());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        assert!(help.starts_with("🌿 <b>Comandos disponíveis:</b>"));
        for info in COMMANDS {
            assert!(help.contains(&format!("/{}", info.name)), "{}", info.name);
        }
        assert!(help.contains("/clima &lt;cidade&gt; – Clima atual"));
    }

    #[tokio::test]
    async fn test_start_and_help() {
        let source = FakeSource::new();
        assert_eq!(reply(&source, Command::Start, &[]).await, Reply::text(GREETING));
        assert!(matches!(reply(&source, Command::Ajuda, &[]).await, Reply::Html(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_dolar() {
        let source = FakeSource {
            rate: Some(5.4321),
            ..FakeSource::new()
        };
        assert_eq!(
            reply(&source, Command::Dolar, &["ignored"]).await,
            Reply::text("Cotação do dólar: R$ 5.43")
        );
    }

    #[tokio::test]
    async fn test_moeda_converts() {
        let source = FakeSource {
            rate: Some(5.1234),
            ..FakeSource::new()
        };
        assert_eq!(
            reply(&source, Command::Moeda, &["100", "usd", "brl"]).await,
            Reply::text("100.00 USD = 512.34 BRL")
        );

        let source = FakeSource {
            rate: Some(4.0),
            ..FakeSource::new()
        };
        assert_eq!(
            reply(&source, Command::Moeda, &["2,5", "usd", "BRL"]).await,
            Reply::text("2.50 USD = 10.00 BRL")
        );
    }

    #[tokio::test]
    async fn test_moeda_wrong_arg_count_makes_no_call() {
        let source = FakeSource::new();
        let attempts: Vec<Vec<&str>> = vec![
            vec![],
            vec!["100"],
            vec!["100", "USD"],
            vec!["1", "USD", "BRL", "x"],
        ];
        for args in &attempts {
            assert_eq!(
                reply(&source, Command::Moeda, args).await,
                Reply::text(MOEDA_USAGE)
            );
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_moeda_invalid_amount() {
        let source = FakeSource::new();
        for amount in ["abc", "1,000.5", "nan", "inf"] {
            assert_eq!(
                reply(&source, Command::Moeda, &[amount, "USD", "BRL"]).await,
                Reply::text(INVALID_AMOUNT)
            );
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_moeda_invalid_pair() {
        let source = FakeSource::empty();
        assert_eq!(
            reply(&source, Command::Moeda, &["1", "XXX", "YYY"]).await,
            Reply::text(INVALID_PAIR)
        );
    }

    #[tokio::test]
    async fn test_clima() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Clima, &["são", "paulo"]).await,
            Reply::text("🌧️ Clima em São Paulo: Chuva fraca, 22.5°C")
        );
    }

    #[tokio::test]
    async fn test_clima_without_args_makes_no_call() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Clima, &[]).await,
            Reply::text(CLIMA_USAGE)
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_clima_city_not_found() {
        let source = FakeSource::empty();
        assert_eq!(
            reply(&source, Command::Clima, &["Atlantida"]).await,
            Reply::text(CITY_NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn test_piada() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Piada, &[]).await,
            Reply::text("Setup\n\nPunch")
        );
    }

    #[tokio::test]
    async fn test_frase_is_canned() {
        let source = FakeSource::new();
        for _ in 0..20 {
            match reply(&source, Command::Frase, &[]).await {
                Reply::Text(text) => assert!(PHRASES.contains(&text.as_str())),
                other => panic!("unexpected reply {:?}", other),
            }
        }
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_pick_phrase_covers_list() {
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<&str> = (0..500).map(|_| pick_phrase(&mut rng)).collect();
        assert_eq!(seen.len(), PHRASES.len());
    }

    #[test]
    fn test_draw_range_is_order_independent() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let text = draw(&["5".to_string(), "1".to_string()], &mut rng);
            let n: u64 = text.strip_prefix("Número sorteado: ").unwrap().parse().unwrap();
            assert!((1..=5).contains(&n));
            seen.insert(n);
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_draw_equal_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            draw(&["3".to_string(), "3".to_string()], &mut rng),
            "Número sorteado: 3"
        );
    }

    #[test]
    fn test_draw_names() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = ["red", "blue", "green"].map(String::from);
        for _ in 0..100 {
            let text = draw(&pool, &mut rng);
            let name = text.strip_prefix("Sorteado: ").unwrap();
            assert!(pool.iter().any(|p| p == name));
        }
    }

    #[test]
    fn test_draw_non_numeric_pair_is_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        for args in [["-1", "5"], ["1.5", "3"], ["99999999999999999999999", "1"]] {
            let args = args.map(String::from);
            let text = draw(&args, &mut rng);
            let name = text.strip_prefix("Sorteado: ").unwrap();
            assert!(args.iter().any(|a| a == name));
        }
    }

    #[tokio::test]
    async fn test_sorteio_without_args() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Sorteio, &[]).await,
            Reply::text(SORTEIO_USAGE)
        );
    }

    #[tokio::test]
    async fn test_gif() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Gif, &["gatos"]).await,
            Reply::Animation(Url::parse("https://media.giphy.com/a.gif").unwrap())
        );
        assert_eq!(
            reply(&FakeSource::empty(), Command::Gif, &["zzz"]).await,
            Reply::text(GIF_NOT_FOUND)
        );

        let source = FakeSource::new();
        assert_eq!(reply(&source, Command::Gif, &[]).await, Reply::text(GIF_USAGE));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_noticias() {
        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Noticias, &["economia"]).await,
            Reply::text("• Manchete\nhttps://n/1")
        );
        assert_eq!(
            reply(&FakeSource::empty(), Command::Noticias, &["economia"]).await,
            Reply::text(NEWS_NOT_FOUND)
        );

        let source = FakeSource::new();
        assert_eq!(
            reply(&source, Command::Noticias, &[]).await,
            Reply::text(NOTICIAS_USAGE)
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        for (command, args) in [
            (Command::Dolar, vec![]),
            (Command::Moeda, vec!["1", "USD", "BRL"]),
            (Command::Clima, vec!["Recife"]),
            (Command::Piada, vec![]),
            (Command::Gif, vec!["gatos"]),
            (Command::Noticias, vec!["economia"]),
        ] {
            assert!(
                handle(&call(command, &args), &BrokenSource).await.is_err(),
                "{:?}",
                command
            );
        }
    }
}
