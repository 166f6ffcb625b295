fn main() {
    // These wiring variants describe different boards; a single chain and a
    // five-chain bank layout cannot both be true.
    assert!(
        !(cfg!(feature = "adafruit-hat") && cfg!(feature = "cm5-chains")),
        "features `adafruit-hat` (single chain) and `cm5-chains` (chains 4-5) cannot be combined"
    );
}
