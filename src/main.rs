#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    oracle_arena::rocket_initialize()
}
