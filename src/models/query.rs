use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::{Error, Result};

/// Marketplace region and the domain suffix it is served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    Au,
    At,
    Be,
    Ca,
    Ch,
    De,
    Es,
    Fr,
    Hk,
    Ie,
    It,
    My,
    Nl,
    Ph,
    Pl,
    Sg,
    Uk,
    #[default]
    Us,
}

impl Region {
    pub const ALL: [Region; 18] = [
        Region::Au,
        Region::At,
        Region::Be,
        Region::Ca,
        Region::Ch,
        Region::De,
        Region::Es,
        Region::Fr,
        Region::Hk,
        Region::Ie,
        Region::It,
        Region::My,
        Region::Nl,
        Region::Ph,
        Region::Pl,
        Region::Sg,
        Region::Uk,
        Region::Us,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Au => "au",
            Region::At => "at",
            Region::Be => "be",
            Region::Ca => "ca",
            Region::Ch => "ch",
            Region::De => "de",
            Region::Es => "es",
            Region::Fr => "fr",
            Region::Hk => "hk",
            Region::Ie => "ie",
            Region::It => "it",
            Region::My => "my",
            Region::Nl => "nl",
            Region::Ph => "ph",
            Region::Pl => "pl",
            Region::Sg => "sg",
            Region::Uk => "uk",
            Region::Us => "us",
        }
    }

    pub fn domain_suffix(self) -> &'static str {
        match self {
            Region::Au => ".com.au",
            Region::At => ".at",
            Region::Be => ".be",
            Region::Ca => ".ca",
            Region::Ch => ".ch",
            Region::De => ".de",
            Region::Es => ".es",
            Region::Fr => ".fr",
            Region::Hk => ".com.hk",
            Region::Ie => ".ie",
            Region::It => ".it",
            Region::My => ".com.my",
            Region::Nl => ".nl",
            Region::Ph => ".ph",
            Region::Pl => ".pl",
            Region::Sg => ".com.sg",
            Region::Uk => ".co.uk",
            Region::Us => ".com",
        }
    }

    pub fn base_url(self) -> String {
        format!("https://www.ebay{}", self.domain_suffix())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|region| region.code() == wanted)
            .ok_or_else(|| Error::Validation {
                parameter: "region",
                value: value.to_string(),
                allowed: Region::ALL.map(Region::code).join(", "),
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    All,
    New,
    Opened,
    Refurbished,
    Used,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::All,
        Condition::New,
        Condition::Opened,
        Condition::Refurbished,
        Condition::Used,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Condition::All => "all",
            Condition::New => "new",
            Condition::Opened => "opened",
            Condition::Refurbished => "refurbished",
            Condition::Used => "used",
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Condition::All => "",
            Condition::New => "&LH_ItemCondition=1000",
            Condition::Opened => "&LH_ItemCondition=1500",
            Condition::Refurbished => "&LH_ItemCondition=2500",
            Condition::Used => "&LH_ItemCondition=3000",
        }
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Condition::ALL
            .into_iter()
            .find(|condition| condition.name() == wanted)
            .ok_or_else(|| Error::Validation {
                parameter: "condition",
                value: value.to_string(),
                allowed: Condition::ALL.map(Condition::name).join(", "),
            })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingType {
    #[default]
    All,
    Auction,
    BuyItNow,
    Offers,
}

impl ListingType {
    pub const ALL: [ListingType; 4] = [
        ListingType::All,
        ListingType::Auction,
        ListingType::BuyItNow,
        ListingType::Offers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ListingType::All => "all",
            ListingType::Auction => "auction",
            ListingType::BuyItNow => "buy-it-now",
            ListingType::Offers => "offers",
        }
    }

    fn filter(self) -> &'static str {
        match self {
            ListingType::All => "&LH_All=1",
            ListingType::Auction => "&LH_Auction=1",
            ListingType::BuyItNow => "&LH_BIN=1",
            ListingType::Offers => "&LH_BO=1",
        }
    }
}

impl FromStr for ListingType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        if wanted == "bin" {
            return Ok(ListingType::BuyItNow);
        }
        ListingType::ALL
            .into_iter()
            .find(|listing_type| listing_type.name() == wanted)
            .ok_or_else(|| Error::Validation {
                parameter: "listing type",
                value: value.to_string(),
                allowed: ListingType::ALL.map(ListingType::name).join(", "),
            })
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated search. Building one from strings is where unsupported
/// parameters are rejected, before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub region: Region,
    pub condition: Condition,
    pub listing_type: ListingType,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            region: Region::default(),
            condition: Condition::default(),
            listing_type: ListingType::default(),
        }
    }

    pub fn parse(query: &str, region: &str, condition: &str, listing_type: &str) -> Result<Self> {
        Ok(Self {
            query: query.to_string(),
            region: region.parse()?,
            condition: condition.parse()?,
            listing_type: listing_type.parse()?,
        })
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_listing_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = listing_type;
        self
    }

    /// Pure URL construction. `base_url` overrides the regional host.
    pub fn search_url(&self, base_url: Option<&str>, completed_only: bool) -> String {
        let host = match base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => self.region.base_url(),
        };
        let keywords: String = form_urlencoded::byte_serialize(self.query.as_bytes()).collect();
        let sold = if completed_only { "&LH_Complete=1&LH_Sold=1" } else { "" };

        format!(
            "{}/sch/i.html?_from=R40&_nkw={}{}{}{}",
            host,
            keywords,
            sold,
            self.condition.filter(),
            self.listing_type.filter()
        )
    }
}
