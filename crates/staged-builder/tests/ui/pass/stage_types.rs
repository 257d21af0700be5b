use staged_builder::StagedBuilder;

#[derive(StagedBuilder)]
pub struct Invoice {
    pub due_date: u64,
    pub amount: u64,
    #[builder(default)]
    pub memo: String,
}

// every mandatory member supplied, in either order
fn settle(stage: &InvoiceBuilder<invoice_builder_stages::Exclude_DueDate_Amount>) -> Invoice {
    stage.add_memo("paid".to_string()).build()
}

fn main() {
    let a = Invoice::builder().add_due_date(1).add_amount(2);
    let b = Invoice::builder().add_amount(2).add_due_date(1);

    assert_eq!(settle(&a).memo, settle(&b).memo);
    assert_eq!(a.build().memo, "");
}
