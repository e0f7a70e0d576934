use draftmaster::reference::{
    DataDragon, icon_url, is_known_champion, list_champions, list_regions, roles_for,
    sanitize_champion_name,
};
use draftmaster::{Region, Role};
use std::time::Duration;

#[test]
fn test_icon_names_drop_punctuation_and_spaces() {
    assert_eq!(sanitize_champion_name("Kai'Sa"), "KaiSa");
    assert_eq!(sanitize_champion_name("Dr. Mundo"), "DrMundo");
    assert_eq!(sanitize_champion_name("Nunu & Willump"), "Nunu&Willump");
    assert_eq!(sanitize_champion_name("Ahri"), "Ahri");
}

#[test]
fn test_icon_url_layout() {
    assert_eq!(
        icon_url("https://ddragon.leagueoflegends.com/", "13.24.1", "Kai'Sa"),
        "https://ddragon.leagueoflegends.com/cdn/13.24.1/img/champion/KaiSa.png"
    );
}

#[test]
fn test_champion_list_is_sorted_and_known() {
    let champions = list_champions();
    assert!(champions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(is_known_champion("Kai'Sa"));
    assert!(is_known_champion("Dr. Mundo"));
    assert!(!is_known_champion("Faker"));
    assert!(!is_known_champion(""));
}

#[test]
fn test_role_lists_only_contain_known_champions() {
    for role in [Role::Top, Role::Jungle, Role::Mid, Role::Adc, Role::Support] {
        let champions = roles_for(role);
        assert!(!champions.is_empty(), "{}", role);
        for champion in champions {
            assert!(is_known_champion(champion), "{} in {}", champion, role);
        }
    }
    assert!(roles_for(Role::Adc).contains(&"Jinx"));
    assert!(roles_for(Role::Support).contains(&"Thresh"));
}

#[test]
fn test_regions_are_ordered() {
    let regions = list_regions();
    assert_eq!(regions.first(), Some(&Region::NA));
    assert_eq!(regions.len(), 11);
    assert!(regions.contains(&Region::KR));
}

#[tokio::test]
async fn test_pinned_client_never_fetches() {
    let data_dragon = DataDragon::pinned("https://ddragon.leagueoflegends.com", "14.5.1");
    assert_eq!(data_dragon.latest_version().await, "14.5.1");
    assert_eq!(
        data_dragon.icon_url("Dr. Mundo").await,
        "https://ddragon.leagueoflegends.com/cdn/14.5.1/img/champion/DrMundo.png"
    );
}

#[tokio::test]
async fn test_unreachable_service_degrades_to_fallback_version() {
    let data_dragon = DataDragon::new("http://127.0.0.1:9", "13.24.1", Duration::from_millis(500));
    assert_eq!(data_dragon.latest_version().await, "13.24.1");
    assert!(data_dragon.icon_url("Ahri").await.ends_with("/cdn/13.24.1/img/champion/Ahri.png"));
}
