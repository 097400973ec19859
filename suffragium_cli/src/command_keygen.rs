pub fn command_keygen(_matches: &clap::ArgMatches) {
    let (secret, public) = suffragium::generate_keypair();

    println!("secret-key: {}", hex::encode(secret.to_bytes()));
    println!("public-key: {}", hex::encode(public.to_bytes()));
    println!("address:    {}", suffragium::Address::from(&public));
}
