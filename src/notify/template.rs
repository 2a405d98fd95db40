//! HTML receipt template rendering.
//!
//! Templates carry `{{NAME}}` placeholders. Rendering substitutes the
//! recognized set from a [`PaymentRecord`] and collapses anything it does
//! not recognize to the empty string, so a stale template can never fail a
//! delivery.

use crate::record::PaymentRecord;

/// Built-in receipt used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: sans-serif; color: #222;">
    <h2>Payment received</h2>
    <table cellpadding="6">
      <tr><td>Product</td><td>{{PRODUCT_NAME}}</td></tr>
      <tr><td>Quantity</td><td>{{QTY}}</td></tr>
      <tr><td>Order</td><td>{{ORDER_NO}}</td></tr>
      <tr><td>Paid with</td><td>{{PAID_WITH}}</td></tr>
      <tr><td>Customer</td><td>{{CUSTOMER_EMAIL}}</td></tr>
      <tr><td><strong>Total</strong></td><td><strong>{{TOTAL}}</strong></td></tr>
    </table>
  </body>
</html>
"#;

/// Render a template against a record.
pub fn render(template: &str, record: &PaymentRecord) -> String {
    let rendered = template
        .replace("{{PRODUCT_NAME}}", &record.product_name)
        .replace("{{QTY}}", &record.quantity.to_string())
        .replace("{{ORDER_NO}}", &record.order_no)
        .replace("{{PAID_WITH}}", &record.payment_method)
        .replace("{{CUSTOMER_EMAIL}}", record.email.as_deref().unwrap_or(""))
        .replace("{{TOTAL}}", &record.amount_readable);

    scrub_unknown_placeholders(&rendered)
}

/// Remove any `{{...}}` token that survived substitution.
fn scrub_unknown_placeholders(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        output.push_str(&rest[..open]);
        match rest[open..].find("}}") {
            Some(close) => rest = &rest[open + close + 2..],
            None => {
                // Unterminated token: keep the tail verbatim.
                output.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}
