//! Demonstration consumer: build a table from a literal, copy it, walk it
//! in reverse, and look a key up in the copy.

use chain_hashmap::ChainHashMap;

fn main() {
    let table = ChainHashMap::from([("world".to_string(), 1), ("hello".to_string(), 9)]);
    let copy = table.clone();

    println!("{} entries, traversed in reverse:", table.len());
    for (key, value) in table.iter().rev() {
        println!("  {key} = {value}");
    }

    let found = copy.find("world");
    match found.key(&copy) {
        Some(key) => println!("copy resolves {key:?}"),
        None => println!("copy lost the key"),
    }

    // Erase while iterating: drop every odd value.
    let mut table = table;
    let mut cursor = match table.cursor_front() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    while cursor.is_valid() {
        let odd = cursor.value(&table).is_some_and(|v| v % 2 == 1);
        if odd {
            table.erase_at(&mut cursor);
        } else {
            cursor = table.advance(cursor);
        }
    }
    println!("after the sweep: {table:?}");
}
