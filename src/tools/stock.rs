//! Company and stock tools backed by a fixed in-memory dataset.

use crate::error::{Error, Result};
use crate::protocol::{ResultContent, Tool};
use crate::server::{parse_arguments, ToolHandler};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_COMPANY_BY_NAME: &str = "getCompanyByName";
pub const GET_ALL_COMPANIES: &str = "getAllCompanies";
pub const GET_STOCK_BY_COMPANY: &str = "getStockByCompany";

/// Lower bound (inclusive) of generated stock prices.
pub const MIN_PRICE: f64 = 100.0;
/// Upper bound (exclusive) of generated stock prices.
pub const MAX_PRICE: f64 = 1100.0;

/// A listed company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub activity: String,
    /// The turnover in billions of MAD
    pub turnover: f64,
    pub employee_count: u32,
    pub country: String,
}

impl Company {
    fn new(name: &str, activity: &str, turnover: f64, employee_count: u32, country: &str) -> Self {
        Self {
            name: name.to_string(),
            activity: activity.to_string(),
            turnover,
            employee_count,
            country: country.to_string(),
        }
    }
}

/// A stock quote generated on request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub company_name: String,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNameParams {
    /// Exact company name, for example "OCP"
    pub company_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Seed dataset, in listing order.
pub fn seed_companies() -> Vec<Company> {
    vec![
        Company::new("Maroc Telecom", "Telecom", 3.6, 10600, "Maroc"),
        Company::new("OCP", "Extraction minière", 5.6, 20000, "Maroc"),
    ]
}

/// Tools over the company dataset.
pub struct StockTools {
    companies: Vec<Company>,
}

impl Default for StockTools {
    fn default() -> Self {
        Self::new(seed_companies())
    }
}

impl StockTools {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// First company whose name matches exactly.
    pub fn get_company_by_name(&self, company_name: &str) -> Result<Company> {
        self.companies
            .iter()
            .find(|c| c.name == company_name)
            .cloned()
            .ok_or_else(|| Error::CompanyNotFound(company_name.to_string()))
    }

    pub fn get_all_companies(&self) -> &[Company] {
        &self.companies
    }

    /// The name is echoed as given; it is not checked against the dataset.
    pub fn get_stock_by_company(&self, company_name: &str) -> Stock {
        Stock {
            company_name: company_name.to_string(),
            date: Local::now().date_naive(),
            price: rand::thread_rng().gen_range(MIN_PRICE..MAX_PRICE),
        }
    }
}

#[async_trait]
impl ToolHandler for StockTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            Tool::new::<CompanyNameParams>(GET_COMPANY_BY_NAME, Some("Get a company by name")),
            Tool::new::<NoParams>(GET_ALL_COMPANIES, Some("Get All Companies")),
            Tool::new::<CompanyNameParams>(GET_STOCK_BY_COMPANY, None),
        ]
    }

    async fn execute(&self, name: &str, arguments: Value) -> Result<Vec<ResultContent>> {
        match name {
            GET_COMPANY_BY_NAME => {
                let params: CompanyNameParams = parse_arguments(arguments)?;
                let company = self.get_company_by_name(&params.company_name)?;
                Ok(vec![ResultContent::json(&company)?])
            }
            GET_ALL_COMPANIES => Ok(vec![ResultContent::json(&self.get_all_companies())?]),
            GET_STOCK_BY_COMPANY => {
                let params: CompanyNameParams = parse_arguments(arguments)?;
                let stock = self.get_stock_by_company(&params.company_name);
                Ok(vec![ResultContent::json(&stock)?])
            }
            _ => Err(Error::ToolNotFound(name.to_string())),
        }
    }
}
