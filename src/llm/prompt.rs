//! Instruction template for question-to-query translation.
//!
//! The schema is not introspected: both tables and every column are spelled
//! out verbatim so the model has nothing to guess, followed by six worked
//! examples and the output-format constraints.

use crate::llm::types::Message;
use std::fmt;
use std::sync::Arc;

/// Database name the instructions refer to.
pub const DATABASE_NAME: &str = "odoo17";

/// Schema that qualifies every table in generated queries.
pub const SCHEMA_NAME: &str = "private_schema";

/// Columns of the `sales` table, in declaration order.
pub const SALES_COLUMNS: &[&str] = &[
    "sale_id",
    "product_name",
    "product_code",
    "sale_date",
    "sale_amount",
    "quantity_sold",
    "customer_id",
    "customer_name",
    "customer_email",
    "shipping_address",
    "billing_address",
    "country",
    "region",
    "city",
    "postal_code",
    "phone_number",
    "payment_method",
    "payment_status",
    "discount_applied",
    "discount_amount",
    "total_amount",
    "tax_rate",
    "tax_amount",
    "shipping_cost",
    "order_status",
    "product_category",
    "product_supplier",
    "sale_channel",
    "warranty_period",
    "sales_rep",
    "notes",
];

/// Columns of the `customer` table, in declaration order.
pub const CUSTOMER_COLUMNS: &[&str] = &[
    "customer_id",
    "customer_name",
    "customer_email",
    "phone_number",
    "address",
    "country",
    "region",
    "city",
    "postal_code",
    "membership_level",
    "signup_date",
];

/// Output-format constraints, stated to the model word for word.
pub const FORMAT_CONSTRAINTS: &str = "The SQL query should not have ``` at the beginning or end, and the word \"SQL\" should not appear in the output.";

/// A worked question/answer pair embedded in the instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exemplar {
    /// Natural-language question.
    pub question: &'static str,
    /// The exact query text expected for the question.
    pub query: &'static str,
}

/// The six few-shot exemplars.
///
/// In order: aggregate count, distinct projection, ordered/limited selection,
/// narrow join, grouped aggregation, wide join.
pub const EXEMPLARS: [Exemplar; 6] = [
    Exemplar {
        question: "How many entries of the records are present?",
        query: "SELECT COUNT(*)\nFROM private_schema.sales;",
    },
    Exemplar {
        question: "Show all the products.",
        query: "SELECT DISTINCT product_name\nFROM private_schema.sales;",
    },
    Exemplar {
        question: "Tell me the top 5 sales.",
        query: "SELECT *\nFROM private_schema.sales\nORDER BY sale_amount DESC\nLIMIT 5;",
    },
    Exemplar {
        question: "Can you show me the sales information along with customer names?",
        query: "SELECT\nsales.sale_id,\nsales.product_name,\nsales.sale_date,\nsales.sale_amount,\nsales.quantity_sold,\nsales.customer_id,\nsales.payment_method,\ncustomer.customer_name,\ncustomer.customer_email\nFROM private_schema.sales AS sales\nJOIN private_schema.customer AS customer\nON sales.customer_id = customer.customer_id;",
    },
    Exemplar {
        question: "Can you show me the total sales amount for each product?",
        query: "SELECT\nproduct_name,\nSUM(sale_amount) AS total_sales\nFROM private_schema.sales\nGROUP BY product_name;",
    },
    Exemplar {
        question: "Show the sales information along with customer information for each sale.",
        query: "SELECT\nsales.sale_id,\nsales.product_name,\nsales.sale_date,\nsales.sale_amount,\nsales.quantity_sold,\nsales.payment_method,\ncustomer.customer_name,\ncustomer.customer_email,\ncustomer.phone_number,\ncustomer.address,\ncustomer.city,\ncustomer.country\nFROM private_schema.sales AS sales\nJOIN private_schema.customer AS customer\nON sales.customer_id = customer.customer_id;",
    },
];

/// The immutable system instructions, rendered once and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTemplate {
    text: Arc<str>,
}

impl InstructionTemplate {
    /// Renders the standard instructions for the sales/customer schema.
    pub fn standard() -> Self {
        Self {
            text: Arc::from(render_standard()),
        }
    }

    /// Wraps arbitrary instruction text.
    pub fn from_text(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the instruction text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for InstructionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render_standard() -> String {
    let mut text = String::new();

    text.push_str("You are an expert in converting English questions to SQL queries!\n");
    text.push_str(&format!(
        "The SQL database is {DATABASE_NAME}, and the schema is {SCHEMA_NAME}. \
         There are two tables: 'sales' and 'customer'.\n\n"
    ));

    text.push_str("The table 'sales' has the following columns:\n");
    text.push_str(&SALES_COLUMNS.join(", "));
    text.push_str(".\n\n");

    text.push_str("The table 'customer' has the following columns:\n");
    text.push_str(&CUSTOMER_COLUMNS.join(", "));
    text.push_str(".\n\n");

    text.push_str("For example:\n");
    for (i, exemplar) in EXEMPLARS.iter().enumerate() {
        text.push_str(&format!("Example {} - {}\n", i + 1, exemplar.question));
        text.push_str("The SQL command will be something like this:\n");
        text.push_str(exemplar.query);
        text.push_str("\n\n");
    }

    text.push_str(FORMAT_CONSTRAINTS);
    text.push('\n');
    text
}

/// Builds the two-message exchange sent to the model: instructions, then the question.
///
/// The question is passed through untouched.
pub fn build_messages(instructions: &str, question: &str) -> Vec<Message> {
    vec![Message::system(instructions), Message::user(question)]
}
