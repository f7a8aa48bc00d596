use avlmap::AvlTreeMap;

fn main() {
    let keys = [44, 17, 78, 32, 50, 88, 48, 62, 54];

    let mut map = AvlTreeMap::new();
    for (index, key) in keys.iter().enumerate() {
        let inserted = map.insert(*key, index);
        println!("insert({key}, {index}) -> {inserted}");
    }
    println!("size: {}, height: {}", map.len(), map.height());
    println!();

    println!("find(50) -> {:?}", map.get(&50));
    println!("find(49) -> {:?}", map.get(&49));
    println!();

    let inorder: Vec<i32> = map.inorder().map(|(key, _)| *key).collect();
    println!("in-order keys:   {inorder:?}");
    let preorder: Vec<i32> = map.preorder().map(|(key, _)| *key).collect();
    println!("pre-order keys:  {preorder:?}");
    let postorder: Vec<i32> = map.postorder().map(|(key, _)| *key).collect();
    println!("post-order keys: {postorder:?}");
    println!("pre-order values: {:?}", map.to_vec());
    println!();

    map.print_tree();

    map.remove(&44);
    println!();
    println!(
        "after remove(44): size {}, height {}, balanced: {}",
        map.len(),
        map.height(),
        map.is_balanced()
    );
    map.print_tree();
}
