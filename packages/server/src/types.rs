use sea_orm::prelude::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket grade of a seat.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum GradeType {
    #[sea_orm(string_value = "VIP")]
    Vip,
    #[sea_orm(string_value = "OP")]
    Op,
    #[sea_orm(string_value = "R")]
    R,
    #[sea_orm(string_value = "S")]
    S,
    #[sea_orm(string_value = "A")]
    A,
    #[sea_orm(string_value = "B")]
    B,
}

impl GradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::Op => "OP",
            Self::R => "R",
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for GradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floor of the auditorium a seat is on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum FloorType {
    #[sea_orm(string_value = "FLOOR1")]
    Floor1,
    #[sea_orm(string_value = "FLOOR2")]
    Floor2,
    #[sea_orm(string_value = "FLOOR3")]
    Floor3,
}

/// Four-step rating used by every review score category.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreType {
    #[sea_orm(string_value = "BAD")]
    Bad,
    #[sea_orm(string_value = "NORMAL")]
    Normal,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "GREAT")]
    Great,
}
