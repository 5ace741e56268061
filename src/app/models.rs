//! Typed records decoded from API responses and data dumps
//!
//! Every record is a flat value built from one XML element; none of them keep
//! a reference to the document they came from. The three dump records also
//! encode back to the element shape the dumps use.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::xml::{parse_value, split_list, XmlElement};
use crate::errors::DecodeResult;

/// Value written by the server for nations outside the World Assembly
pub const WA_NON_MEMBER: &str = "Non-member";

/// Three-axis freedom summary, either as labels or as scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freedoms<T> {
    pub civil_rights: T,
    pub economy: T,
    pub political_freedom: T,
}

impl<T: FromStr + Display> Freedoms<T> {
    /// Decode a FREEDOM or FREEDOMSCORES element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            civil_rights: node.parse_child("CIVILRIGHTS")?,
            economy: node.parse_child("ECONOMY")?,
            political_freedom: node.parse_child("POLITICALFREEDOM")?,
        })
    }

    fn to_xml(&self, tag: &str) -> XmlElement {
        XmlElement::new(tag)
            .child_element(leaf("CIVILRIGHTS", &self.civil_rights))
            .child_element(leaf("ECONOMY", &self.economy))
            .child_element(leaf("POLITICALFREEDOM", &self.political_freedom))
    }
}

/// Share of deaths attributed to one cause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathCause {
    pub cause: String,
    pub percentage: f64,
}

impl DeathCause {
    /// Decode a CAUSE element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            cause: node.attr("type").unwrap_or_default().to_string(),
            percentage: parse_value("CAUSE", node.content())?,
        })
    }

    fn to_xml(&self) -> XmlElement {
        XmlElement::with_text("CAUSE", self.percentage.to_string()).attribute("type", &self.cause)
    }
}

/// A nation record from the nations dump or the standard nation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationSnapshot {
    pub name: String,
    pub classification: String,
    pub full_name: String,
    pub motto: String,
    pub category: String,
    pub wa_status: String,
    pub endorsements: Vec<String>,
    pub issues_answered: u32,
    pub freedom: Freedoms<String>,
    pub region: String,
    pub population: u64,
    pub tax: f64,
    pub animal: String,
    pub currency: String,
    pub demonym: String,
    pub demonym2: String,
    pub demonym2_plural: String,
    pub flag: String,
    pub major_industry: String,
    pub government_priority: String,
    pub government: BTreeMap<String, f64>,
    pub founded: String,
    pub first_login: i64,
    pub last_login: i64,
    pub influence: String,
    pub freedom_scores: Freedoms<i64>,
    pub public_sector: f64,
    pub deaths: Vec<DeathCause>,
    pub leader: String,
    pub capital: String,
    pub religion: String,
    pub factbooks: u32,
    pub dispatches: u32,
    pub dbid: u64,
}

impl NationSnapshot {
    /// Decode a NATION element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            name: node.text_of("NAME")?.to_string(),
            classification: node.text_of("TYPE")?.to_string(),
            full_name: node.text_of("FULLNAME")?.to_string(),
            motto: node.text_of("MOTTO")?.to_string(),
            category: node.text_of("CATEGORY")?.to_string(),
            wa_status: node.text_of("UNSTATUS")?.to_string(),
            endorsements: split_list(node.text_of("ENDORSEMENTS")?, ','),
            issues_answered: node.parse_child("ISSUES_ANSWERED")?,
            freedom: Freedoms::from_xml(node.require("FREEDOM")?)?,
            region: node.text_of("REGION")?.to_string(),
            population: node.parse_child("POPULATION")?,
            tax: node.parse_child("TAX")?,
            animal: node.text_of("ANIMAL")?.to_string(),
            currency: node.text_of("CURRENCY")?.to_string(),
            demonym: node.text_of("DEMONYM")?.to_string(),
            demonym2: node.text_of("DEMONYM2")?.to_string(),
            demonym2_plural: node.text_of("DEMONYM2PLURAL")?.to_string(),
            flag: node.text_of("FLAG")?.to_string(),
            major_industry: node.text_of("MAJORINDUSTRY")?.to_string(),
            government_priority: node.text_of("GOVTPRIORITY")?.to_string(),
            government: node
                .require("GOVT")?
                .children
                .iter()
                .map(|area| -> DecodeResult<(String, f64)> {
                    Ok((area.tag.clone(), parse_value(&area.tag, area.content())?))
                })
                .collect::<DecodeResult<_>>()?,
            founded: node.text_of("FOUNDED")?.to_string(),
            first_login: node.parse_child("FIRSTLOGIN")?,
            last_login: node.parse_child("LASTLOGIN")?,
            influence: node.text_of("INFLUENCE")?.to_string(),
            freedom_scores: Freedoms::from_xml(node.require("FREEDOMSCORES")?)?,
            public_sector: node.parse_child("PUBLICSECTOR")?,
            deaths: node
                .require("DEATHS")?
                .children
                .iter()
                .map(DeathCause::from_xml)
                .collect::<DecodeResult<_>>()?,
            leader: node.text_of("LEADER")?.to_string(),
            capital: node.text_of("CAPITAL")?.to_string(),
            religion: node.text_of("RELIGION")?.to_string(),
            factbooks: node.parse_child("FACTBOOKS")?,
            dispatches: node.parse_child("DISPATCHES")?,
            dbid: node.parse_child("DBID")?,
        })
    }

    /// Encode as a NATION element
    pub fn to_xml(&self) -> XmlElement {
        let government = self
            .government
            .iter()
            .fold(XmlElement::new("GOVT"), |govt, (area, spend)| {
                govt.child_element(leaf(area, spend))
            });
        let deaths = self
            .deaths
            .iter()
            .fold(XmlElement::new("DEATHS"), |deaths, cause| {
                deaths.child_element(cause.to_xml())
            });

        XmlElement::new("NATION")
            .child_element(leaf("NAME", &self.name))
            .child_element(leaf("TYPE", &self.classification))
            .child_element(leaf("FULLNAME", &self.full_name))
            .child_element(leaf("MOTTO", &self.motto))
            .child_element(leaf("CATEGORY", &self.category))
            .child_element(leaf("UNSTATUS", &self.wa_status))
            .child_element(leaf("ENDORSEMENTS", self.endorsements.join(",")))
            .child_element(leaf("ISSUES_ANSWERED", self.issues_answered))
            .child_element(self.freedom.to_xml("FREEDOM"))
            .child_element(leaf("REGION", &self.region))
            .child_element(leaf("POPULATION", self.population))
            .child_element(leaf("TAX", self.tax))
            .child_element(leaf("ANIMAL", &self.animal))
            .child_element(leaf("CURRENCY", &self.currency))
            .child_element(leaf("DEMONYM", &self.demonym))
            .child_element(leaf("DEMONYM2", &self.demonym2))
            .child_element(leaf("DEMONYM2PLURAL", &self.demonym2_plural))
            .child_element(leaf("FLAG", &self.flag))
            .child_element(leaf("MAJORINDUSTRY", &self.major_industry))
            .child_element(leaf("GOVTPRIORITY", &self.government_priority))
            .child_element(government)
            .child_element(leaf("FOUNDED", &self.founded))
            .child_element(leaf("FIRSTLOGIN", self.first_login))
            .child_element(leaf("LASTLOGIN", self.last_login))
            .child_element(leaf("INFLUENCE", &self.influence))
            .child_element(self.freedom_scores.to_xml("FREEDOMSCORES"))
            .child_element(leaf("PUBLICSECTOR", self.public_sector))
            .child_element(deaths)
            .child_element(leaf("LEADER", &self.leader))
            .child_element(leaf("CAPITAL", &self.capital))
            .child_element(leaf("RELIGION", &self.religion))
            .child_element(leaf("FACTBOOKS", self.factbooks))
            .child_element(leaf("DISPATCHES", self.dispatches))
            .child_element(leaf("DBID", self.dbid))
    }

    /// Whether the nation is a World Assembly member or delegate
    pub fn is_wa_member(&self) -> bool {
        !self.wa_status.is_empty() && self.wa_status != WA_NON_MEMBER
    }
}

/// A regional officer and their permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub nation: String,
    pub office: String,
    /// Each letter is one permission
    pub authority: String,
    pub time: i64,
    pub by: String,
    pub order: i64,
}

impl Officer {
    /// Decode an OFFICER element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            nation: node.text_of("NATION")?.to_string(),
            office: node.text_of("OFFICE")?.to_string(),
            authority: node.text_of("AUTHORITY")?.to_string(),
            time: node.parse_child("TIME")?,
            by: node.text_of("BY")?.to_string(),
            order: node.parse_child("ORDER")?,
        })
    }

    fn to_xml(&self) -> XmlElement {
        XmlElement::new("OFFICER")
            .child_element(leaf("NATION", &self.nation))
            .child_element(leaf("OFFICE", &self.office))
            .child_element(leaf("AUTHORITY", &self.authority))
            .child_element(leaf("TIME", self.time))
            .child_element(leaf("BY", &self.by))
            .child_element(leaf("ORDER", self.order))
    }
}

/// An embassy between two regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embassy {
    pub region: String,
    pub status: String,
}

impl Embassy {
    const OPEN: &'static str = "open";

    /// Decode an EMBASSY element; embassies without a type are open
    pub fn from_xml(node: &XmlElement) -> Self {
        Self {
            region: node.content().to_string(),
            status: node.attr("type").unwrap_or(Self::OPEN).to_string(),
        }
    }

    fn to_xml(&self) -> XmlElement {
        let embassy = XmlElement::with_text("EMBASSY", &self.region);
        if self.status == Self::OPEN {
            embassy
        } else {
            embassy.attribute("type", &self.status)
        }
    }
}

/// A region record from the regions dump or the standard region request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub name: String,
    pub factbook: String,
    pub num_nations: u32,
    pub nations: Vec<String>,
    pub delegate: String,
    pub delegate_votes: u32,
    pub delegate_auth: String,
    pub founder: String,
    pub founder_auth: String,
    pub officers: Vec<Officer>,
    pub power: String,
    pub flag: String,
    pub embassies: Vec<Embassy>,
    pub last_update: i64,
}

impl RegionSnapshot {
    /// Decode a REGION element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            name: node.text_of("NAME")?.to_string(),
            factbook: node.text_of("FACTBOOK")?.to_string(),
            num_nations: node.parse_child("NUMNATIONS")?,
            nations: split_list(node.text_of("NATIONS")?, ':'),
            delegate: node.text_of("DELEGATE")?.to_string(),
            delegate_votes: node.parse_child("DELEGATEVOTES")?,
            delegate_auth: node.text_of("DELEGATEAUTH")?.to_string(),
            founder: node.text_of("FOUNDER")?.to_string(),
            founder_auth: node.text_of("FOUNDERAUTH")?.to_string(),
            officers: node
                .require("OFFICERS")?
                .children
                .iter()
                .map(Officer::from_xml)
                .collect::<DecodeResult<_>>()?,
            power: node.text_of("POWER")?.to_string(),
            flag: node.text_of("FLAG")?.to_string(),
            embassies: node
                .require("EMBASSIES")?
                .children
                .iter()
                .map(Embassy::from_xml)
                .collect(),
            last_update: node.parse_child("LASTUPDATE")?,
        })
    }

    /// Encode as a REGION element
    pub fn to_xml(&self) -> XmlElement {
        let officers = self
            .officers
            .iter()
            .fold(XmlElement::new("OFFICERS"), |all, officer| {
                all.child_element(officer.to_xml())
            });
        let embassies = self
            .embassies
            .iter()
            .fold(XmlElement::new("EMBASSIES"), |all, embassy| {
                all.child_element(embassy.to_xml())
            });

        XmlElement::new("REGION")
            .child_element(leaf("NAME", &self.name))
            .child_element(leaf("FACTBOOK", &self.factbook))
            .child_element(leaf("NUMNATIONS", self.num_nations))
            .child_element(leaf("NATIONS", self.nations.join(":")))
            .child_element(leaf("DELEGATE", &self.delegate))
            .child_element(leaf("DELEGATEVOTES", self.delegate_votes))
            .child_element(leaf("DELEGATEAUTH", &self.delegate_auth))
            .child_element(leaf("FOUNDER", &self.founder))
            .child_element(leaf("FOUNDERAUTH", &self.founder_auth))
            .child_element(officers)
            .child_element(leaf("POWER", &self.power))
            .child_element(leaf("FLAG", &self.flag))
            .child_element(embassies)
            .child_element(leaf("LASTUPDATE", self.last_update))
    }
}

/// A card record from a season's card list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: u64,
    pub name: String,
    pub rarity: String,
    pub classification: String,
    pub motto: String,
    pub region: String,
    pub government: String,
    pub flag: String,
    pub description: String,
    pub badges: Vec<String>,
    pub trophies: BTreeMap<String, u32>,
}

impl CardSnapshot {
    /// Decode a CARD element from a card list
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            id: node.parse_child("ID")?,
            name: node.text_of("NAME")?.to_string(),
            rarity: node.text_of("CARDCATEGORY")?.to_string(),
            classification: node.text_of("TYPE")?.to_string(),
            motto: node.text_of("MOTTO")?.to_string(),
            region: node.text_of("REGION")?.to_string(),
            government: node.text_of("CATEGORY")?.to_string(),
            flag: node.text_of("FLAG")?.to_string(),
            description: node.text_of("DESCRIPTION")?.to_string(),
            badges: node
                .require("BADGES")?
                .children
                .iter()
                .map(|badge| badge.content().to_string())
                .collect(),
            trophies: node
                .require("TROPHIES")?
                .children
                .iter()
                .map(|trophy| -> DecodeResult<(String, u32)> {
                    let kind = trophy.attr("type").unwrap_or_default().to_string();
                    Ok((kind, parse_value("TROPHY", trophy.content())?))
                })
                .collect::<DecodeResult<_>>()?,
        })
    }

    /// Encode as a CARD element
    pub fn to_xml(&self) -> XmlElement {
        let badges = self
            .badges
            .iter()
            .fold(XmlElement::new("BADGES"), |all, badge| {
                all.child_element(leaf("BADGE", badge))
            });
        let trophies = self
            .trophies
            .iter()
            .fold(XmlElement::new("TROPHIES"), |all, (kind, rank)| {
                all.child_element(leaf("TROPHY", rank).attribute("type", kind))
            });

        XmlElement::new("CARD")
            .child_element(leaf("ID", self.id))
            .child_element(leaf("NAME", &self.name))
            .child_element(leaf("CARDCATEGORY", &self.rarity))
            .child_element(leaf("TYPE", &self.classification))
            .child_element(leaf("MOTTO", &self.motto))
            .child_element(leaf("REGION", &self.region))
            .child_element(leaf("CATEGORY", &self.government))
            .child_element(leaf("FLAG", &self.flag))
            .child_element(leaf("DESCRIPTION", &self.description))
            .child_element(badges)
            .child_element(trophies)
    }
}

/// One world event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Happening {
    pub id: u64,
    pub timestamp: Option<i64>,
    pub text: String,
}

impl Happening {
    /// Decode an EVENT element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            id: node.parse_attr("id")?,
            timestamp: node.parse_optional("TIMESTAMP")?,
            text: node.text_or_empty("TEXT").to_string(),
        })
    }
}

/// One trade of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub buyer: String,
    pub seller: String,
    /// Absent for gifts
    pub price: Option<f64>,
    pub timestamp: i64,
}

impl Trade {
    /// Decode a TRADE element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            buyer: node.text_of("BUYER")?.to_string(),
            seller: node.text_of("SELLER")?.to_string(),
            price: node.parse_optional("PRICE")?,
            timestamp: node.parse_child("TIMESTAMP")?,
        })
    }
}

/// Identifies a card within a deck
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardIdentifier {
    pub id: u64,
    pub rarity: String,
    pub season: u32,
}

impl CardIdentifier {
    /// Decode a CARD element from a deck
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            id: node.parse_child("CARDID")?,
            rarity: node.text_of("CATEGORY")?.to_string(),
            season: node.parse_child("SEASON")?,
        })
    }
}

/// Details returned by the card info shard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: u64,
    pub rarity: String,
    pub season: u32,
    pub flag: String,
    pub government: String,
    pub market_value: f64,
    pub name: String,
    pub region: String,
    pub slogan: String,
    pub classification: String,
}

impl CardInfo {
    /// Decode a CARD element returned by the info shard
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            id: node.parse_child("CARDID")?,
            rarity: node.text_of("CATEGORY")?.to_string(),
            season: node.parse_child("SEASON")?,
            flag: node.text_of("FLAG")?.to_string(),
            government: node.text_of("GOVT")?.to_string(),
            market_value: node.parse_child("MARKET_VALUE")?,
            name: node.text_of("NAME")?.to_string(),
            region: node.text_of("REGION")?.to_string(),
            slogan: node.text_of("SLOGAN")?.to_string(),
            classification: node.text_of("TYPE")?.to_string(),
        })
    }

    /// The identifying subset of this card
    pub fn identifier(&self) -> CardIdentifier {
        CardIdentifier {
            id: self.id,
            rarity: self.rarity.clone(),
            season: self.season,
        }
    }
}

/// Summary of a nation's deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckInfo {
    pub bank: f64,
    pub deck_capacity: u32,
    pub deck_value: f64,
    pub id: u64,
    pub last_pack_opened: Option<i64>,
    pub last_valued: Option<i64>,
    pub name: String,
    pub num_cards: u32,
    pub rank: u64,
    pub region_rank: u64,
}

impl DeckInfo {
    /// Decode an INFO element from the deck info shard
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        Ok(Self {
            bank: node.parse_child("BANK")?,
            deck_capacity: node.parse_child("DECK_CAPACITY_RAW")?,
            deck_value: node.parse_child("DECK_VALUE")?,
            id: node.parse_child("ID")?,
            last_pack_opened: node.parse_optional("LAST_PACK_OPENED")?,
            last_valued: node.parse_optional("LAST_VALUED")?,
            name: node.text_of("NAME")?.to_string(),
            num_cards: node.parse_child("NUM_CARDS")?,
            rank: node.parse_child("RANK")?,
            region_rank: node.parse_child("REGION_RANK")?,
        })
    }
}

/// An unanswered issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u32,
    pub title: String,
    pub text: String,
    pub author: String,
    pub editors: Vec<String>,
    pub pic1: String,
    pub pic2: String,
    /// Option id to option text
    pub options: BTreeMap<u32, String>,
}

impl Issue {
    /// Decode an ISSUE element
    pub fn from_xml(node: &XmlElement) -> DecodeResult<Self> {
        let editors = node.text_or_empty("EDITOR");
        Ok(Self {
            id: node.parse_attr("id")?,
            title: node.text_of("TITLE")?.to_string(),
            text: node.text_of("TEXT")?.to_string(),
            author: node.text_or_empty("AUTHOR").to_string(),
            editors: if editors.is_empty() {
                Vec::new()
            } else {
                editors.split(", ").map(str::to_string).collect()
            },
            pic1: node.text_or_empty("PIC1").to_string(),
            pic2: node.text_or_empty("PIC2").to_string(),
            options: node
                .children_named("OPTION")
                .map(|option| -> DecodeResult<(u32, String)> {
                    Ok((option.parse_attr("id")?, option.content().to_string()))
                })
                .collect::<DecodeResult<_>>()?,
        })
    }
}

/// Nations and regions a nation keeps in its dossier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dossier {
    pub nations: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

impl Dossier {
    /// Decode the DOSSIER and RDOSSIER shards of a nation response
    pub fn from_xml(node: &XmlElement) -> Self {
        let names = |tag: &str| -> BTreeSet<String> {
            node.child(tag)
                .map(|list| {
                    list.children
                        .iter()
                        .map(|entry| entry.content().to_string())
                        .collect()
                })
                .unwrap_or_default()
        };
        Self {
            nations: names("DOSSIER"),
            regions: names("RDOSSIER"),
        }
    }
}

fn leaf(tag: &str, value: impl ToString) -> XmlElement {
    XmlElement::with_text(tag, value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nation() -> NationSnapshot {
        NationSnapshot {
            name: "Testlandia".to_string(),
            classification: "Republic".to_string(),
            full_name: "The Republic of Testlandia".to_string(),
            motto: "Of the <tests>, by the tests & for the tests".to_string(),
            category: "Democratic Socialists".to_string(),
            wa_status: "WA Delegate".to_string(),
            endorsements: vec!["nation_a".to_string(), "nation_b".to_string()],
            issues_answered: 1234,
            freedom: Freedoms {
                civil_rights: "Very Good".to_string(),
                economy: "Strong".to_string(),
                political_freedom: "Excellent".to_string(),
            },
            region: "Testregionia".to_string(),
            population: 35_125,
            tax: 29.5,
            animal: "kangaroo".to_string(),
            currency: "Kro-bro-ünze".to_string(),
            demonym: "Testlandish".to_string(),
            demonym2: "Testlandian".to_string(),
            demonym2_plural: "Testlandians".to_string(),
            flag: "https://www.nationstates.net/images/flags/testlandia.svg".to_string(),
            major_industry: "Information Technology".to_string(),
            government_priority: "Education".to_string(),
            government: [("DEFENCE".to_string(), 4.25), ("EDUCATION".to_string(), 21.0)]
                .into_iter()
                .collect(),
            founded: "antiquity".to_string(),
            first_login: 1_011_847_200,
            last_login: 1_700_000_000,
            influence: "Eminence Grise".to_string(),
            freedom_scores: Freedoms {
                civil_rights: 75,
                economy: 64,
                political_freedom: 81,
            },
            public_sector: 47.1,
            deaths: vec![DeathCause {
                cause: "Old Age".to_string(),
                percentage: 73.4,
            }],
            leader: "Max Barry".to_string(),
            capital: "Test City".to_string(),
            religion: "Testism".to_string(),
            factbooks: 3,
            dispatches: 7,
            dbid: 1,
        }
    }

    fn sample_region() -> RegionSnapshot {
        RegionSnapshot {
            name: "Testregionia".to_string(),
            factbook: "Home of [b]tests[/b]".to_string(),
            num_nations: 2,
            nations: vec!["testlandia".to_string(), "other".to_string()],
            delegate: "testlandia".to_string(),
            delegate_votes: 3,
            delegate_auth: "XWA".to_string(),
            founder: "0".to_string(),
            founder_auth: "".to_string(),
            officers: vec![Officer {
                nation: "other".to_string(),
                office: "Minister".to_string(),
                authority: "AC".to_string(),
                time: 1_600_000_000,
                by: "testlandia".to_string(),
                order: 1,
            }],
            power: "Low".to_string(),
            flag: "".to_string(),
            embassies: vec![
                Embassy {
                    region: "The Pacific".to_string(),
                    status: "open".to_string(),
                },
                Embassy {
                    region: "Lazarus".to_string(),
                    status: "closing".to_string(),
                },
            ],
            last_update: 1_700_000_123,
        }
    }

    fn sample_card() -> CardSnapshot {
        CardSnapshot {
            id: 926_511,
            name: "Testlandia".to_string(),
            rarity: "legendary".to_string(),
            classification: "Republic".to_string(),
            motto: "Tests".to_string(),
            region: "Testregionia".to_string(),
            government: "Democratic Socialists".to_string(),
            flag: "testlandia.svg".to_string(),
            description: "A nation of tests.".to_string(),
            badges: vec!["Admin".to_string()],
            trophies: [("HAPPY-1".to_string(), 5), ("WEALTH-10".to_string(), 2)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_nation_round_trip() {
        let nation = sample_nation();
        let encoded = nation.to_xml().to_xml();
        let decoded = NationSnapshot::from_xml(&XmlElement::parse(encoded.as_bytes()).unwrap());
        assert_eq!(decoded.unwrap(), nation);
    }

    #[test]
    fn test_region_round_trip() {
        let region = sample_region();
        let encoded = region.to_xml().to_xml();
        let decoded = RegionSnapshot::from_xml(&XmlElement::parse(encoded.as_bytes()).unwrap());
        assert_eq!(decoded.unwrap(), region);
    }

    #[test]
    fn test_card_round_trip() {
        let card = sample_card();
        let encoded = card.to_xml().to_xml();
        let decoded = CardSnapshot::from_xml(&XmlElement::parse(encoded.as_bytes()).unwrap());
        assert_eq!(decoded.unwrap(), card);
    }

    #[test]
    fn test_wa_membership() {
        let mut nation = sample_nation();
        assert!(nation.is_wa_member());
        nation.wa_status = WA_NON_MEMBER.to_string();
        assert!(!nation.is_wa_member());
    }

    #[test]
    fn test_happening_without_timestamp() {
        let node = XmlElement::parse(
            b"<EVENT id=\"77\"><TIMESTAMP></TIMESTAMP><TEXT>@@a@@ did a thing</TEXT></EVENT>",
        )
        .unwrap();
        let happening = Happening::from_xml(&node).unwrap();
        assert_eq!(happening.id, 77);
        assert_eq!(happening.timestamp, None);
        assert_eq!(happening.text, "@@a@@ did a thing");
    }

    #[test]
    fn test_trade_gift_has_no_price() {
        let node = XmlElement::parse(
            b"<TRADE><BUYER>a</BUYER><SELLER>b</SELLER><PRICE></PRICE><TIMESTAMP>10</TIMESTAMP></TRADE>",
        )
        .unwrap();
        let trade = Trade::from_xml(&node).unwrap();
        assert_eq!(trade.price, None);
        assert_eq!(trade.timestamp, 10);
    }

    #[test]
    fn test_issue_options() {
        let node = XmlElement::parse(
            br#"<ISSUE id="5"><TITLE>T</TITLE><TEXT>Body</TEXT><AUTHOR>me</AUTHOR><EDITOR>x, y</EDITOR><OPTION id="0">Yes</OPTION><OPTION id="1">No</OPTION></ISSUE>"#,
        )
        .unwrap();
        let issue = Issue::from_xml(&node).unwrap();
        assert_eq!(issue.id, 5);
        assert_eq!(issue.editors, vec!["x", "y"]);
        assert_eq!(issue.options.get(&1).map(String::as_str), Some("No"));
        assert!(issue.pic1.is_empty());
    }

    #[test]
    fn test_dossier() {
        let node = XmlElement::parse(
            b"<NATION><DOSSIER><NATION>a</NATION><NATION>b</NATION></DOSSIER><RDOSSIER/></NATION>",
        )
        .unwrap();
        let dossier = Dossier::from_xml(&node);
        assert_eq!(dossier.nations.len(), 2);
        assert!(dossier.regions.is_empty());
    }
}
