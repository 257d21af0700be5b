use staged_builder::StagedBuilder;

mod ids {
    pub fn make_user(id: u32, name: String) -> super::User {
        super::User { id, name, admin: false }
    }
}

#[derive(StagedBuilder)]
#[builder(constructor = "ids::make_user")]
pub struct User {
    #[builder(arg)]
    id: u32,
    #[builder(arg)]
    name: String,
    #[builder(default = "true")]
    admin: bool,
}

fn main() {
    let user = User::builder().add_name("root".to_string()).add_id(0).build();
    assert!(user.admin);
    assert_eq!(user.id, 0);
    assert_eq!(user.name, "root");
}
