// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Declared property types and their source-form parser

use chrono::{DateTime, NaiveDate};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, map, map_res, recognize},
    multi::{many0_count, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of a declared property after parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    String,
    /// 32 bit signed integer
    Integer,
    /// 64 bit signed integer
    Long,
    Double,
    Boolean,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    Date,
    /// Arbitrary JSON value
    Json,
    Enum(Vec<String>),
    /// Reference to another node type
    Reference(String),
    Collection(Box<PropertyType>),
}

impl PropertyType {
    /// Parse a declared type such as `String`, `Enum(a, b)` or `Ref(File)[]`
    pub fn parse(source: &str) -> Result<Self, String> {
        all_consuming(ws(property_type))(source)
            .map(|(_, parsed)| parsed)
            .map_err(|e| format!("invalid property type '{}': {}", source, e))
    }

    /// Node type this property points at, looking through collections
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            PropertyType::Reference(target) => Some(target),
            PropertyType::Collection(inner) => inner.referenced_type(),
            _ => None,
        }
    }

    /// Check a non-null value against this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PropertyType::String => value.is_string(),
            PropertyType::Integer => value
                .as_i64()
                .map_or(false, |v| i32::try_from(v).is_ok()),
            PropertyType::Long => value.as_i64().is_some(),
            PropertyType::Double => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Date => value.as_str().map_or(false, is_date),
            PropertyType::Json => true,
            PropertyType::Enum(values) => value
                .as_str()
                .map_or(false, |s| values.iter().any(|v| v == s)),
            PropertyType::Reference(_) => {
                value.is_string() || value.get("id").map_or(false, Value::is_string)
            }
            PropertyType::Collection(inner) => value
                .as_array()
                .map_or(false, |items| items.iter().all(|item| inner.accepts(item))),
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::String => write!(f, "String"),
            PropertyType::Integer => write!(f, "Integer"),
            PropertyType::Long => write!(f, "Long"),
            PropertyType::Double => write!(f, "Double"),
            PropertyType::Boolean => write!(f, "Boolean"),
            PropertyType::Date => write!(f, "Date"),
            PropertyType::Json => write!(f, "Json"),
            PropertyType::Enum(values) => write!(f, "Enum({})", values.join(", ")),
            PropertyType::Reference(target) => write!(f, "Ref({})", target),
            PropertyType::Collection(inner) => write!(f, "{}[]", inner),
        }
    }
}

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn scalar(input: &str) -> IResult<&str, PropertyType> {
    map_res(identifier, |name: &str| match name {
        "String" => Ok(PropertyType::String),
        "Integer" => Ok(PropertyType::Integer),
        "Long" => Ok(PropertyType::Long),
        "Double" => Ok(PropertyType::Double),
        "Boolean" => Ok(PropertyType::Boolean),
        "Date" => Ok(PropertyType::Date),
        "Json" => Ok(PropertyType::Json),
        _ => Err(()),
    })(input)
}

fn enumeration(input: &str) -> IResult<&str, PropertyType> {
    map(
        preceded(
            pair(tag("Enum"), multispace0),
            delimited(
                char('('),
                separated_list1(char(','), ws(identifier)),
                char(')'),
            ),
        ),
        |values: Vec<&str>| PropertyType::Enum(values.into_iter().map(String::from).collect()),
    )(input)
}

fn reference(input: &str) -> IResult<&str, PropertyType> {
    map(
        preceded(
            pair(tag("Ref"), multispace0),
            delimited(char('('), ws(identifier), char(')')),
        ),
        |target: &str| PropertyType::Reference(target.to_string()),
    )(input)
}

fn property_type(input: &str) -> IResult<&str, PropertyType> {
    let (input, base) = alt((enumeration, reference, scalar))(input)?;
    let (input, depth) = many0_count(preceded(multispace0, tag("[]")))(input)?;

    let parsed = (0..depth).fold(base, |inner, _| PropertyType::Collection(Box::new(inner)));
    Ok((input, parsed))
}
