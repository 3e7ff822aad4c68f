use regex::Regex;
use serde_json::Value;

use super::normalize::str_field;

/// Topical category of a market. `ALL` is the fixed display order and the
/// classification priority: keyword sets overlap (a politics market can
/// name an NBA team's city), so the first match in this order wins.
pub const ALL_CATEGORIES: &[&str] = &[
    "Sports",
    "Politics",
    "Crypto",
    "Business",
    "Science",
    "Entertainment",
    "Other",
];

/// Compiled keyword patterns, checked in priority order. Stateless and
/// deterministic; built once at startup.
pub struct Classifier {
    patterns: Vec<(&'static str, Regex)>,
}

const SPORTS: &str = r"\bnba\b|\bnfl\b|\bnhl\b|\bmlb\b|\bufc\b|\bmma\b|premier league|champions league|la liga|bundesliga|serie a|ligue 1|world cup|euro 202|super bowl|stanley cup|world series|playoffs|finals|championship|mvp|rookie|draft|knicks|lakers|celtics|warriors|bulls|heat|nets|76ers|suns|mavericks|bucks|clippers|cowboys|eagles|chiefs|49ers|bills|ravens|yankees|dodgers|braves|man city|man united|liverpool|chelsea|arsenal|tottenham|real madrid|barcelona|bayern|juventus|psg|tennis|golf|boxing|f1\b|formula 1|nascar|cricket|rugby";

const POLITICS: &str = r"trump|biden|harris|obama|clinton|desantis|newsom|pence|vance|president|election|vote|poll|senate|congress|house of rep|governor|mayor|democrat|republican|gop|politic|impeach|pardon|cabinet|secretary|minister|prime minister|parliament|ukraine|russia|china|israel|gaza|iran|north korea|ceasefire|treaty|white house|capitol|supreme court|scotus|electoral|swing state|midterm|primary";

const CRYPTO: &str = r"bitcoin|btc|\beth\b|ethereum|solana|\bsol\b|\bxrp\b|ripple|doge|dogecoin|cardano|polygon|matic|avalanche|chainlink|polkadot|cosmos|arbitrum|optimism|tether|usdt|usdc|bnb|shiba|pepe|bonk|wif|sui|aptos|celestia|starknet|crypto|defi|nft|token|blockchain|web3|\bdao\b|binance|coinbase|kraken|etf.*bitcoin|bitcoin.*etf|halving|staking|airdrop|altcoin|memecoin|microstrategy";

const BUSINESS: &str = r"tesla|apple|amazon|google|alphabet|meta|facebook|microsoft|nvidia|amd|intel|netflix|disney|walmart|starbucks|boeing|ford|uber|lyft|airbnb|paypal|visa|jpmorgan|goldman|blackrock|berkshire|palantir|stock|share price|nasdaq|nyse|dow jones|s&p 500|\bspy\b|\bqqq\b|market cap|\bipo\b|earnings|revenue|profit|quarterly|dividend|merger|acquisition|bankrupt|layoff|ceo|cfo|investor|inflation|recession|gdp|federal reserve|\bfed\b|interest rate|rate cut|rate hike|unemployment|treasury|bond|oil price|commodity|economy|economic|corporate";

const SCIENCE: &str = r"\bai\b|artificial intelligence|machine learning|gpt|chatgpt|claude|gemini|llama|llm|neural|deep learning|robot|spacex|starship|falcon|rocket|launch|orbit|mars|moon|nasa|space station|satellite|starlink|neuralink|quantum|semiconductor|chip|processor|medicine|drug|fda|clinical|vaccine|treatment|disease|medical|gene|crispr|biotech|pharmaceutical|\bagi\b|autonomous|self.driving|nuclear|fusion|climate";

const ENTERTAINMENT: &str = r"movie|film|cinema|box office|oscar|academy award|golden globe|emmy|grammy|tony|billboard|album|song|artist|singer|band|concert|tour|music|spotify|netflix|disney\+|hbo|streaming|tv show|series|season|episode|actor|actress|director|celebrity|hollywood|taylor swift|beyonce|drake|kanye|kardashian|youtube|tiktok|instagram|influencer|viral|trending|gaming|esports|twitch|playstation|xbox|nintendo|fortnite|minecraft|call of duty|anime|manga|marvel|dc|star wars";

impl Classifier {
    pub fn new() -> Self {
        let sets = [
            ("Sports", SPORTS),
            ("Politics", POLITICS),
            ("Crypto", CRYPTO),
            ("Business", BUSINESS),
            ("Science", SCIENCE),
            ("Entertainment", ENTERTAINMENT),
        ];
        let patterns = sets
            .into_iter()
            .map(|(cat, pat)| {
                let re = Regex::new(pat).expect("category pattern must compile");
                (cat, re)
            })
            .collect();
        Self { patterns }
    }

    /// First matching category for an already-lowercased text blob.
    pub fn classify_text(&self, text: &str) -> &'static str {
        for (category, re) in &self.patterns {
            if re.is_match(text) {
                return category;
            }
        }
        "Other"
    }

    /// Classifies a raw market object: question, title, description, tag
    /// labels, and group title are concatenated and lowercased.
    pub fn classify_market(&self, market: &Value) -> &'static str {
        let mut text = String::new();
        for key in ["question", "title", "description", "groupItemTitle"] {
            if let Some(s) = str_field(market, &[key]) {
                text.push_str(&s);
                text.push(' ');
            }
        }
        if let Some(Value::Array(tags)) = market.get("tags") {
            for tag in tags {
                match tag {
                    Value::String(s) => {
                        text.push_str(s);
                        text.push(' ');
                    }
                    Value::Object(_) => {
                        if let Some(label) = tag.get("label").and_then(Value::as_str) {
                            text.push_str(label);
                            text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
        }
        self.classify_text(&text.to_lowercase())
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
