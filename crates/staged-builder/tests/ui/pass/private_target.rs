use staged_builder::StagedBuilder;

mod shapes {
    use super::StagedBuilder;

    #[derive(StagedBuilder)]
    pub(crate) struct Circle {
        pub(crate) radius: f64,
        #[builder(default = "String::from(\"red\")")]
        pub(crate) color: String,
    }
}

fn main() {
    let circle = shapes::Circle::builder().add_radius(2.0).build();
    assert_eq!(circle.color, "red");
}
