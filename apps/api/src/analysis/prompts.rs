// Prompt templates for the five analysis kinds.
// Placeholders: {technology}, {vendor_focus}, {sections}, {word_ceiling}.
// {sections} is rendered from the kind's section list so the headings the model
// is asked for are exactly the headings the extractor looks for.

pub const MARKET_TEMPLATE: &str = r#"Write a market analysis of {technology}.

Use these sections, each starting with its heading in bold exactly as written:
{sections}

Give the current global market size in USD, the CAGR as a percentage, the main
demand drivers, and the segments (by industry and region) growing fastest.

{word_ceiling}"#;

pub const VENDOR_TEMPLATE: &str = r#"Write a vendor landscape analysis of {technology}.{vendor_focus}

Use these sections, each starting with its heading in bold exactly as written:
{sections}

List vendors one per line as "- Vendor Name: one-line positioning". Name real
companies only.

{word_ceiling}"#;

pub const VENDOR_FOCUS_TEMPLATE: &str =
    "\nPay particular attention to {vendor} and how it compares with its closest competitors.";

pub const MATURITY_TEMPLATE: &str = r#"Assess the maturity of {technology}.

Use these sections, each starting with its heading in bold exactly as written:
{sections}

State the current hype cycle phase using one of: Innovation Trigger, Peak of
Inflated Expectations, Trough of Disillusionment, Slope of Enlightenment,
Plateau of Productivity. Give an overall maturity score as "Maturity score: N/10".

{word_ceiling}"#;

pub const FORECAST_TEMPLATE: &str = r#"Forecast the adoption of {technology} over the next five years.

Use these sections, each starting with its heading in bold exactly as written:
{sections}

In the adoption section give one line per year in the form "2026: NN% of enterprises".

{word_ceiling}"#;

pub const QUADRANT_TEMPLATE: &str = r#"Position the leading vendors of {technology} in a Magic Quadrant style analysis.

Use these sections, each starting with its heading in bold exactly as written:
{sections}

In VENDOR POSITIONS, write one block per vendor (6 to 10 vendors) in exactly this form:

VENDOR: <name>
QUADRANT: <Leaders | Challengers | Visionaries | Niche Players>
ABILITY TO EXECUTE: <0-10>
COMPLETENESS OF VISION: <0-10>
{factor_lines}

Scores are numbers from 0 to 10 with at most one decimal.

{word_ceiling}"#;
