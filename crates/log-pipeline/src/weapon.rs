//! 무기 테이블 -- 로그 식별자와 표시 이름의 양방향 매핑
//!
//! srcds 로그의 `with "..."`/`(weapon "...")` 값은 소문자 식별자입니다.
//! [`Weapon::from_log_name`]은 알 수 없는 식별자를 에러 없이 [`Weapon::UnknownWeapon`]으로 바꿉니다.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// `Variant => ("log_name", "Display Name")` 목록에서 enum과 조회 테이블을 생성합니다.
macro_rules! weapons {
    ($($variant:ident => ($log:literal, $display:literal)),+ $(,)?) => {
        /// 무기
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Weapon {
            $($variant,)+
            /// 테이블에 없는 식별자
            UnknownWeapon,
        }

        const WEAPON_TABLE: &[(Weapon, &str, &str)] = &[
            $((Weapon::$variant, $log, $display),)+
        ];
    };
}

weapons! {
    // scout
    Scattergun => ("scattergun", "Scattergun"),
    ForceANature => ("force_a_nature", "Force-A-Nature"),
    Shortstop => ("shortstop", "Shortstop"),
    SodaPopper => ("soda_popper", "Soda Popper"),
    BabyFaceBlaster => ("pep_brawlerblaster", "Baby Face's Blaster"),
    BackScatter => ("back_scatter", "Back Scatter"),
    PistolScout => ("pistol_scout", "Pistol (Scout)"),
    PrettyBoysPocketPistol => ("pep_pistol", "Pretty Boy's Pocket Pistol"),
    TheWinger => ("the_winger", "Winger"),
    FlyingGuillotine => ("guillotine", "Flying Guillotine"),
    Bat => ("bat", "Bat"),
    Sandman => ("bat_wood", "Sandman"),
    SandmanBall => ("ball", "Sandman Ball"),
    HolyMackerel => ("holy_mackerel", "Holy Mackerel"),
    Atomizer => ("atomizer", "Atomizer"),
    CandyCane => ("candy_cane", "Candy Cane"),
    BostonBasher => ("boston_basher", "Boston Basher"),
    ThreeRuneBlade => ("scout_sword", "Three-Rune Blade"),
    SunOnAStick => ("lava_bat", "Sun-on-a-Stick"),
    FanOWar => ("warfan", "Fan O'War"),
    WrapAssassin => ("wrap_assassin", "Wrap Assassin"),
    // soldier
    ProjectileRocket => ("tf_projectile_rocket", "Rocket Launcher"),
    DirectHit => ("rocketlauncher_directhit", "Direct Hit"),
    BlackBox => ("blackbox", "Black Box"),
    LibertyLauncher => ("liberty_launcher", "Liberty Launcher"),
    Original => ("quake_rl", "Original"),
    CowMangler => ("cow_mangler", "Cow Mangler 5000"),
    BeggarsBazooka => ("dumpster_device", "Beggar's Bazooka"),
    Airstrike => ("airstrike", "Air Strike"),
    ShotgunSoldier => ("shotgun_soldier", "Shotgun (Soldier)"),
    ReserveShooter => ("reserve_shooter", "Reserve Shooter"),
    RighteousBison => ("righteous_bison", "Righteous Bison"),
    PanicAttack => ("panic_attack", "Panic Attack"),
    Shovel => ("shovel", "Shovel"),
    Equalizer => ("unique_pickaxe", "Equalizer"),
    EscapePlan => ("unique_pickaxe_escape", "Escape Plan"),
    MarketGardener => ("market_gardener", "Market Gardener"),
    DisciplinaryAction => ("disciplinary_action", "Disciplinary Action"),
    PainTrain => ("paintrain", "Pain Train"),
    Mantreads => ("mantreads", "Mantreads"),
    // pyro
    FlameThrower => ("flamethrower", "Flame Thrower"),
    Backburner => ("backburner", "Backburner"),
    Degreaser => ("degreaser", "Degreaser"),
    Phlog => ("phlogistinator", "Phlogistinator"),
    Rainblower => ("rainblower", "Rainblower"),
    DragonsFury => ("dragons_fury", "Dragon's Fury"),
    DragonsFuryBonus => ("dragons_fury_bonus", "Dragon's Fury Bonus"),
    FlareGun => ("flaregun", "Flare Gun"),
    Detonator => ("detonator", "Detonator"),
    ScorchShot => ("scorch_shot", "Scorch Shot"),
    Manmelter => ("manmelter", "Manmelter"),
    ShotgunPyro => ("shotgun_pyro", "Shotgun (Pyro)"),
    FireAxe => ("fireaxe", "Fire Axe"),
    Axtinguisher => ("axtinguisher", "Axtinguisher"),
    Powerjack => ("powerjack", "Powerjack"),
    BackScratcher => ("back_scratcher", "Back Scratcher"),
    SharpenedVolcanoFragment => ("lava_axe", "Sharpened Volcano Fragment"),
    ThirdDegree => ("thirddegree", "Third Degree"),
    NeonAnnihilator => ("annihilator_neonsign", "Neon Annihilator"),
    DeflectRocket => ("deflect_rocket", "Deflect Rocket"),
    DeflectPromode => ("deflect_promode", "Deflect Grenade"),
    DeflectSticky => ("deflect_sticky", "Deflect Sticky"),
    DeflectArrow => ("deflect_arrow", "Deflect Arrow"),
    DeflectFlare => ("deflect_flare", "Deflect Flare"),
    // demoman
    ProjectilePipe => ("tf_projectile_pipe", "Grenade Launcher"),
    ProjectileSticky => ("tf_projectile_pipe_remote", "Stickybomb"),
    LockNLoad => ("loch_n_load", "Loch-n-Load"),
    LooseCannonImpact => ("loose_cannon_impact", "Loose Cannon Impact"),
    LooseCannonExplosion => ("loose_cannon_explosion", "Loose Cannon Explosion"),
    IronBomber => ("iron_bomber", "Iron Bomber"),
    Quickiebomb => ("quickiebomb_launcher", "Quickiebomb Launcher"),
    ScottishResistance => ("sticky_resistance", "Scottish Resistance"),
    Bottle => ("bottle", "Bottle"),
    Eyelander => ("sword", "Eyelander"),
    DemoKatana => ("demokatana", "Half-Zatoichi"),
    ClaidheamhMor => ("claidheamohmor", "Claidheamh Mor"),
    PersianPersuader => ("persian_persuader", "Persian Persuader"),
    Caber => ("ullapool_caber", "Caber"),
    CaberExplosion => ("ullapool_caber_explosion", "Caber Explosion"),
    ScotsmansSkullcutter => ("battleaxe", "Scotsman's Skullcutter"),
    NessiesNineIron => ("nessieclub", "Nessie's Nine Iron"),
    CharginTarge => ("demoshield", "Chargin' Targe"),
    SplendidScreen => ("splendid_screen", "Splendid Screen"),
    TideTurner => ("tide_turner", "Tide Turner"),
    // heavy
    Minigun => ("minigun", "Minigun"),
    Natascha => ("natascha", "Natascha"),
    BrassBeast => ("brass_beast", "Brass Beast"),
    Tomislav => ("tomislav", "Tomislav"),
    HuoLongHeater => ("long_heatmaker", "Huo-Long Heater"),
    IronCurtain => ("iron_curtain", "Iron Curtain"),
    ShotgunHeavy => ("shotgun_hwg", "Shotgun (Heavy)"),
    FamilyBusiness => ("family_business", "Family Business"),
    Fists => ("fists", "Fists"),
    Kgb => ("gloves", "Killing Gloves of Boxing"),
    Gru => ("gloves_running_urgently", "Gloves of Running Urgently"),
    WarriorsSpirit => ("warrior_spirit", "Warrior's Spirit"),
    FistsOfSteel => ("steel_fists", "Fists of Steel"),
    EvictionNotice => ("eviction_notice", "Eviction Notice"),
    HolidayPunch => ("holiday_punch", "Holiday Punch"),
    BreadBite => ("bread_bite", "Bread Bite"),
    ApocoFists => ("apocofists", "Apoco Fists"),
    // engineer
    ShotgunEngy => ("shotgun_primary", "Shotgun (Engy)"),
    FrontierJustice => ("frontier_justice", "Frontier Justice"),
    Widowmaker => ("widowmaker", "Widowmaker"),
    Pomson => ("pomson", "Pomson 6000"),
    RescueRanger => ("rescue_ranger", "Rescue Ranger"),
    PistolEngy => ("pistol", "Pistol (Engy)"),
    ShortCircuit => ("short_circuit", "Short Circuit"),
    Wrangler => ("wrangler_kill", "Wrangler"),
    Wrench => ("wrench", "Wrench"),
    GoldenWrench => ("wrench_golden", "Golden Wrench"),
    Gunslinger => ("robot_arm", "Gunslinger"),
    GunslingerCombo => ("robot_arm_combo_kill", "Gunslinger Combo"),
    GunslingerKill => ("robot_arm_blender_kill", "Gunslinger Kill"),
    SouthernHospitality => ("southern_hospitality", "Southern Hospitality"),
    Jag => ("wrench_jag", "Jag"),
    EurekaEffect => ("eureka_effect", "Eureka Effect"),
    Sentry1 => ("obj_sentrygun", "Sentry (Level 1)"),
    Sentry2 => ("obj_sentrygun2", "Sentry (Level 2)"),
    Sentry3 => ("obj_sentrygun3", "Sentry (Level 3)"),
    MiniSentry => ("obj_minisentry", "Sentry (mini)"),
    SentryRocket => ("tf_projectile_sentryrocket", "Sentry (Rocket)"),
    // medic
    SyringeGun => ("syringegun_medic", "Syringe Gun"),
    Blutsauger => ("blutsauger", "Blutsauger"),
    Crossbow => ("crusaders_crossbow", "Crusader's Crossbow"),
    OverdoseSyringe => ("proto_syringe", "Overdose"),
    Ubersaw => ("ubersaw", "Ubersaw"),
    Bonesaw => ("bonesaw", "Bonesaw"),
    Amputator => ("amputator", "Amputator"),
    VitaSaw => ("battleneedle", "Vita-Saw"),
    SolemnVow => ("solemn_vow", "Solemn Vow"),
    // sniper
    SniperRifle => ("sniperrifle", "Sniper Rifle"),
    AwperHand => ("awper_hand", "Awper Hand"),
    BazaarBargain => ("bazaar_bargain", "Bazaar Bargain"),
    Machina => ("machina", "Machina"),
    MachinaPen => ("player_penetration", "Machina Penetration"),
    ProRifle => ("pro_rifle", "Hitman's Heatmaker"),
    SydneySleeper => ("sydney_sleeper", "Sydney Sleeper"),
    TheClassic => ("the_classic", "Classic"),
    ProjectileArrow => ("tf_projectile_arrow", "Huntsman"),
    ProjectileArrowFire => ("tf_projectile_arrow_fire", "Huntsman (Burning)"),
    Smg => ("smg", "SMG"),
    ProSmg => ("pro_smg", "Cleaner's Carbine"),
    Kukri => ("club", "Kukri"),
    TribalmansShiv => ("tribalkukri", "Tribalman's Shiv"),
    Bushwacka => ("bushwacka", "Bushwacka"),
    Shahanshah => ("shahanshah", "Shahanshah"),
    // spy
    Revolver => ("revolver", "Revolver"),
    Ambassador => ("ambassador", "Ambassador"),
    Letranger => ("letranger", "L'Etranger"),
    Enforcer => ("enforcer", "Enforcer"),
    Diamondback => ("diamondback", "Diamondback"),
    Knife => ("knife", "Knife"),
    EternalReward => ("eternal_reward", "Your Eternal Reward"),
    Kunai => ("kunai", "Conniver's Kunai"),
    BigEarner => ("big_earner", "Big Earner"),
    Spycicle => ("spy_cicle", "Spy-cicle"),
    BlackRose => ("black_rose", "Black Rose"),
    SharpDresser => ("sharp_dresser", "Sharp Dresser"),
    Sapper => ("obj_attachment_sapper", "Sapper"),
    // 공용 / 환경
    FryingPan => ("fryingpan", "Frying Pan"),
    GoldenFryingPan => ("golden_fryingpan", "Golden Frying Pan"),
    Saxxy => ("saxxy", "Saxxy"),
    BleedKill => ("bleed_kill", "Bleed"),
    Player => ("player", "Finished Off"),
    World => ("world", "World"),
    Telefrag => ("telefrag", "Telefrag"),
    BuildingCarriedDestroyed => ("building_carried_destroyed", "Building Destroyed (Carried)"),
    PumpkinBomb => ("tf_pumpkin_bomb", "Pumpkin Bomb"),
    TauntScout => ("taunt_scout", "Taunt (Scout)"),
    TauntSoldier => ("taunt_soldier", "Taunt (Soldier)"),
    TauntPyro => ("taunt_pyro", "Taunt (Pyro)"),
    TauntDemoman => ("taunt_demoman", "Taunt (Demoman)"),
    TauntHeavy => ("taunt_heavy", "Taunt (Heavy)"),
    TauntEngineer => ("taunt_engineer", "Taunt (Engineer)"),
    TauntGuitarKill => ("taunt_guitar_kill", "Taunt (Guitar)"),
    TauntMedic => ("taunt_medic", "Taunt (Medic)"),
    TauntSniper => ("taunt_sniper", "Taunt (Sniper)"),
    TauntSpy => ("taunt_spy", "Taunt (Spy)"),
}

static BY_LOG_NAME: LazyLock<HashMap<&'static str, Weapon>> = LazyLock::new(|| {
    WEAPON_TABLE
        .iter()
        .map(|(weapon, log, _)| (*log, *weapon))
        .collect()
});

static BY_WEAPON: LazyLock<HashMap<Weapon, (&'static str, &'static str)>> =
    LazyLock::new(|| {
        WEAPON_TABLE
            .iter()
            .map(|(weapon, log, display)| (*weapon, (*log, *display)))
            .collect()
    });

impl Weapon {
    /// 로그 식별자에서 무기를 찾습니다. 대소문자를 구분하지 않습니다.
    ///
    /// 테이블에 없으면 `UnknownWeapon`을 반환하며 실패하지 않습니다.
    pub fn from_log_name(name: &str) -> Self {
        let trimmed = name.trim();
        if let Some(weapon) = BY_LOG_NAME.get(trimmed) {
            return *weapon;
        }
        BY_LOG_NAME
            .get(trimmed.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(Self::UnknownWeapon)
    }

    /// 로그 식별자를 반환합니다. `UnknownWeapon`은 `"unknown"`.
    pub fn log_name(self) -> &'static str {
        BY_WEAPON.get(&self).map_or("unknown", |(log, _)| *log)
    }

    /// 표시 이름을 반환합니다. `UnknownWeapon`은 `"Unknown"`.
    pub fn display_name(self) -> &'static str {
        BY_WEAPON.get(&self).map_or("Unknown", |(_, display)| *display)
    }

    /// 테이블에 등록된 모든 무기를 반환합니다.
    pub fn all() -> impl Iterator<Item = Self> {
        WEAPON_TABLE.iter().map(|(weapon, _, _)| *weapon)
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn known_log_names_resolve() {
        assert_eq!(Weapon::from_log_name("tf_projectile_rocket"), Weapon::ProjectileRocket);
        assert_eq!(Weapon::from_log_name("spy_cicle"), Weapon::Spycicle);
        assert_eq!(Weapon::from_log_name("demokatana"), Weapon::DemoKatana);
        assert_eq!(Weapon::from_log_name("obj_sentrygun3"), Weapon::Sentry3);
        assert_eq!(Weapon::from_log_name("SNIPERRIFLE"), Weapon::SniperRifle);
    }

    #[test]
    fn unknown_names_never_fail() {
        assert_eq!(Weapon::from_log_name("laser_pointer_9000"), Weapon::UnknownWeapon);
        assert_eq!(Weapon::from_log_name(""), Weapon::UnknownWeapon);
        assert_eq!(Weapon::UnknownWeapon.display_name(), "Unknown");
        assert_eq!(Weapon::UnknownWeapon.log_name(), "unknown");
    }

    #[test]
    fn mapping_is_bidirectional_and_unique() {
        let mut logs = HashSet::new();
        for weapon in Weapon::all() {
            assert!(logs.insert(weapon.log_name()), "duplicate {}", weapon.log_name());
            assert_eq!(Weapon::from_log_name(weapon.log_name()), weapon);
        }
        assert_eq!(Weapon::ForceANature.to_string(), "Force-A-Nature");
    }
}
