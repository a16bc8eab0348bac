mod test_dropping_handle_leaves_room;
