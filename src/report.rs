use crate::models::{Attribute, LadderPrice, Product, Trade};
use crate::parser::PageMeta;

/// Plain-text summary of a product, written as `<id>.txt`.
pub fn render_report(product: &Product, trade: &Trade, meta: &PageMeta) -> String {
    let logistic = &trade.logistic_info;

    let prices: String = product
        .price
        .product_ladder_prices
        .iter()
        .map(ladder_line)
        .collect();

    let mut properties = String::new();
    if !product.product_key_industry_properties.is_empty() {
        properties.push_str("Key properties:\n");
        properties.push_str(&attribute_lines(&product.product_key_industry_properties));
        properties.push_str("\nOther properties:\n");
    }
    properties.push_str(&attribute_lines(&product.product_basic_properties));

    let customization: String = product
        .product_light_customization_list
        .iter()
        .map(|c| format!(">>> Customization: {}, MOQ: {:.0}\n", c.custom_type, c.moq))
        .collect();

    format!(
        "
Title: {}
Keywords: {}
Description: {}

Price:
{}
Properties:
{}
Packaging & delivery:
{}
Supply ability: {}
Customization:
{}
See {}.html for the product details

",
        product.subject,
        meta.keywords,
        meta.description,
        prices,
        properties,
        attribute_lines(&logistic.product_packaging_properties),
        logistic.supply_ability.as_deref().unwrap_or_default(),
        customization,
        product.product_id,
    )
}

fn ladder_line(tier: &LadderPrice) -> String {
    if tier.max < 0.0 {
        format!(
            ">>> Quantity: [{:.0}+], Price: {}\n",
            tier.min, tier.format_price
        )
    } else {
        format!(
            ">>> Quantity: [{:.0} - {:.0}], Price: {}\n",
            tier.min, tier.max, tier.format_price
        )
    }
}

fn attribute_lines(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .map(|a| format!(">>> {}: {}\n", a.attr_name, a.attr_value))
        .collect()
}
