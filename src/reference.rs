use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::OnceCell;

use crate::error::{AIError, Upstream};
use crate::roster::{Region, Role};
use crate::settings::Settings;

// region:  --- Champions

const CHAMPIONS: &[&str] = &[
    "Aatrox", "Ahri", "Akali", "Akshan", "Alistar", "Amumu", "Anivia", "Annie", "Aphelios",
    "Ashe", "Aurelion Sol", "Azir", "Bard", "Bel'Veth", "Blitzcrank", "Brand", "Braum",
    "Caitlyn", "Camille", "Cassiopeia", "Cho'Gath", "Corki", "Darius", "Diana", "Dr. Mundo",
    "Draven", "Ekko", "Elise", "Evelynn", "Ezreal", "Fiddlesticks", "Fiora", "Fizz", "Galio",
    "Gangplank", "Garen", "Gnar", "Gragas", "Graves", "Gwen", "Hecarim", "Heimerdinger",
    "Illaoi", "Irelia", "Ivern", "Janna", "Jarvan IV", "Jax", "Jayce", "Jhin", "Jinx",
    "K'Sante", "Kai'Sa", "Kalista", "Karma", "Karthus", "Kassadin", "Katarina", "Kayle",
    "Kayn", "Kennen", "Kha'Zix", "Kindred", "Kled", "Kog'Maw", "LeBlanc", "Lee Sin", "Leona",
    "Lillia", "Lissandra", "Lucian", "Lulu", "Lux", "Malphite", "Malzahar", "Maokai",
    "Master Yi", "Miss Fortune", "Mordekaiser", "Morgana", "Nami", "Nasus", "Nautilus",
    "Neeko", "Nidalee", "Nilah", "Nocturne", "Nunu & Willump", "Olaf", "Orianna", "Ornn",
    "Pantheon", "Poppy", "Pyke", "Qiyana", "Quinn", "Rakan", "Rammus", "Rek'Sai", "Rell",
    "Renata Glasc", "Renekton", "Rengar", "Riven", "Rumble", "Ryze", "Samira", "Sejuani",
    "Senna", "Seraphine", "Sett", "Shaco", "Shen", "Shyvana", "Singed", "Sion", "Sivir",
    "Skarner", "Sona", "Soraka", "Swain", "Sylas", "Syndra", "Tahm Kench", "Taliyah", "Talon",
    "Taric", "Teemo", "Thresh", "Tristana", "Trundle", "Tryndamere", "Twisted Fate", "Twitch",
    "Udyr", "Urgot", "Varus", "Vayne", "Veigar", "Vel'Koz", "Vex", "Vi", "Viego", "Viktor",
    "Vladimir", "Volibear", "Warwick", "Wukong", "Xayah", "Xerath", "Xin Zhao", "Yasuo",
    "Yone", "Yorick", "Yuumi", "Zac", "Zed", "Zeri", "Ziggs", "Zilean", "Zoe", "Zyra",
];

static SORTED_CHAMPIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut champions = CHAMPIONS.to_vec();
    champions.sort_unstable();
    champions.dedup();
    champions
});

// endregion:  --- Champions

// region:  --- Roles

const TOP: &[&str] = &[
    "Aatrox", "Camille", "Darius", "Fiora", "Gangplank", "Garen", "Gnar", "Gwen", "Illaoi",
    "Irelia", "Jax", "Jayce", "K'Sante", "Kayle", "Kennen", "Kled", "Malphite", "Mordekaiser",
    "Nasus", "Ornn", "Pantheon", "Poppy", "Renekton", "Riven", "Sett", "Shen", "Singed", "Sion",
    "Teemo", "Tryndamere", "Urgot", "Volibear", "Wukong", "Yorick",
];

const JUNGLE: &[&str] = &[
    "Amumu", "Bel'Veth", "Diana", "Ekko", "Elise", "Evelynn", "Fiddlesticks", "Gragas",
    "Graves", "Hecarim", "Ivern", "Jarvan IV", "Karthus", "Kayn", "Kha'Zix", "Kindred",
    "Lee Sin", "Lillia", "Master Yi", "Nidalee", "Nocturne", "Nunu & Willump", "Olaf",
    "Rammus", "Rek'Sai", "Rengar", "Sejuani", "Shaco", "Shyvana", "Skarner", "Trundle", "Udyr",
    "Vi", "Viego", "Warwick", "Xin Zhao", "Zac",
];

const MID: &[&str] = &[
    "Ahri", "Akali", "Akshan", "Anivia", "Annie", "Aurelion Sol", "Azir", "Cassiopeia", "Corki",
    "Fizz", "Galio", "Heimerdinger", "Kassadin", "Katarina", "LeBlanc", "Lissandra", "Lux",
    "Malzahar", "Neeko", "Orianna", "Qiyana", "Ryze", "Sylas", "Syndra", "Taliyah", "Talon",
    "Twisted Fate", "Veigar", "Vex", "Viktor", "Vladimir", "Xerath", "Yasuo", "Yone", "Zed",
    "Ziggs", "Zoe",
];

const ADC: &[&str] = &[
    "Aphelios", "Ashe", "Caitlyn", "Draven", "Ezreal", "Jhin", "Jinx", "Kai'Sa", "Kalista",
    "Kog'Maw", "Lucian", "Miss Fortune", "Nilah", "Samira", "Sivir", "Tristana", "Twitch",
    "Varus", "Vayne", "Xayah", "Zeri",
];

const SUPPORT: &[&str] = &[
    "Alistar", "Bard", "Blitzcrank", "Brand", "Braum", "Janna", "Karma", "Leona", "Lulu",
    "Morgana", "Nami", "Nautilus", "Pyke", "Rakan", "Rell", "Renata Glasc", "Senna",
    "Seraphine", "Sona", "Soraka", "Tahm Kench", "Taric", "Thresh", "Yuumi", "Zilean", "Zyra",
];

// endregion:  --- Roles

pub fn list_champions() -> &'static [&'static str] {
    &SORTED_CHAMPIONS
}

pub fn is_known_champion(champion: &str) -> bool {
    SORTED_CHAMPIONS.binary_search(&champion).is_ok()
}

// Champions usually played in a role. Not exhaustive, and a champion can appear in none.
pub fn roles_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Top => TOP,
        Role::Jungle => JUNGLE,
        Role::Mid => MID,
        Role::Adc => ADC,
        Role::Support => SUPPORT,
    }
}

pub fn list_regions() -> Vec<Region> {
    Region::iter().collect()
}

// Data Dragon asset names drop apostrophes, spaces and periods: "Kai'Sa" -> "KaiSa".
pub fn sanitize_champion_name(champion: &str) -> String {
    champion
        .chars()
        .filter(|c| !matches!(c, '\'' | ' ' | '.'))
        .collect()
}

pub fn icon_url(base_url: &str, version: &str, champion: &str) -> String {
    format!(
        "{}/cdn/{}/img/champion/{}.png",
        base_url.trim_end_matches('/'),
        version,
        sanitize_champion_name(champion)
    )
}

// Read-only client for the versioned game-data CDN.
// The latest version is fetched at most once per client; failures degrade to the fallback.
pub struct DataDragon {
    http: reqwest::Client,
    base_url: String,
    fallback_version: String,
    timeout: Duration,
    version: OnceCell<String>,
}

impl DataDragon {
    pub fn new(base_url: impl Into<String>, fallback_version: impl Into<String>, timeout: Duration) -> Self {
        DataDragon {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            fallback_version: fallback_version.into(),
            timeout,
            version: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.data_dragon_url.clone(),
            settings.fallback_game_version.clone(),
            settings.request_timeout(),
        )
    }

    // A client that never touches the network.
    pub fn pinned(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        DataDragon {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            fallback_version: version.clone(),
            timeout: Duration::ZERO,
            version: OnceCell::new_with(Some(version)),
        }
    }

    pub fn fallback_version(&self) -> &str {
        &self.fallback_version
    }

    pub async fn latest_version(&self) -> &str {
        self.version
            .get_or_init(|| async {
                match self.fetch_latest_version().await {
                    Ok(version) => {
                        log::info!("Data Dragon version: {}", version);
                        version
                    }
                    Err(e) => {
                        log::warn!(
                            "Falling back to game data version {}: {}",
                            self.fallback_version,
                            e
                        );
                        self.fallback_version.clone()
                    }
                }
            })
            .await
    }

    pub async fn icon_url(&self, champion: &str) -> String {
        icon_url(&self.base_url, self.latest_version().await, champion)
    }

    async fn fetch_latest_version(&self) -> Result<String, AIError> {
        let url = format!("{}/api/versions.json", self.base_url.trim_end_matches('/'));
        let unavailable = |reason: String| AIError::unavailable(Upstream::GameData, reason, true);

        let response = tokio::time::timeout(self.timeout, self.http.get(&url).send())
            .await
            .map_err(|_| unavailable("request timed out".to_string()))?
            .map_err(|e| unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| unavailable(e.to_string()))?;

        let versions: Vec<VersionEntry> = response
            .json()
            .await
            .map_err(|e| AIError::malformed(format!("versions.json: {}", e)))?;

        versions
            .into_iter()
            .next()
            .map(|VersionEntry(version)| version)
            .filter(|version| !version.trim().is_empty())
            .ok_or_else(|| AIError::malformed("versions.json is empty"))
    }
}

#[derive(Deserialize)]
struct VersionEntry(String);
